use std::collections::{HashMap, HashSet};
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::editor::EditorSession;
use crate::io::autosave::Autosave;
use crate::io::config_io;
use crate::io::document_io::{DocumentStore, FileStore};
use crate::model::{AppConfig, TaskNode, TreeDocument, clamp_zoom};
use crate::ops::tree_ops;
use crate::preview::url::{self, PreviewRequest};

use super::input;
use super::render;
use super::theme::Theme;

/// Cells the view shifts per pan step
const PAN_STEP: f64 = 2.0;
const MAX_PAN: f64 = 40.0;

/// Which view is currently displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// The whole tree, indented
    Tree,
    /// Leaf tasks only, flat
    List,
}

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Asking whether to restore the saved tree
    Restore,
    Edit,
    /// Typing the path of an image to attach to the focused task
    Attach,
}

/// What the binary resolved before starting the UI
pub struct RunOptions {
    pub config: AppConfig,
    pub data_path: PathBuf,
    /// Skip the restore prompt and start from the default tree
    pub fresh: bool,
}

/// Main application state
pub struct App {
    pub session: EditorSession,
    /// Zoom and pan; `root` is only refreshed when a snapshot is taken
    pub document: TreeDocument,
    pub view: View,
    pub mode: Mode,
    pub should_quit: bool,
    pub theme: Theme,
    pub show_key_hints: bool,
    /// Indent width in cells at zoom 1.0
    pub indent: u16,
    /// Byte offset of the cursor in the focused task's text
    pub edit_cursor: usize,
    /// Cursor offset each task had when it last lost focus
    pub last_cursor: HashMap<String, usize>,
    pub attach_input: String,
    pub status_message: Option<String>,
    /// Saved document waiting for the user's restore decision
    pub restore_candidate: Option<TreeDocument>,
    pub images_dir: PathBuf,
    pub autosave: Autosave,
    /// Task ids drawn by the last render pass
    pub rendered_ids: HashSet<String>,
    /// First visible content row
    pub scroll_offset: usize,
    scheduled_revision: u64,
    view_dirty: bool,
}

impl App {
    pub fn new(session: EditorSession, config: &AppConfig, images_dir: PathBuf) -> Self {
        let scheduled_revision = session.revision();
        App {
            session,
            document: TreeDocument::initial(),
            view: View::Tree,
            mode: Mode::Edit,
            should_quit: false,
            theme: Theme::from_config(&config.ui),
            show_key_hints: config.ui.show_key_hints,
            indent: config.ui.indent,
            edit_cursor: 0,
            last_cursor: HashMap::new(),
            attach_input: String::new(),
            status_message: None,
            restore_candidate: None,
            images_dir,
            autosave: Autosave::new(Duration::from_millis(config.storage.autosave_delay_ms)),
            rendered_ids: HashSet::new(),
            scroll_offset: 0,
            scheduled_revision,
            view_dirty: false,
        }
    }

    // -----------------------------------------------------------------------
    // Restore prompt
    // -----------------------------------------------------------------------

    pub fn offer_restore(&mut self, doc: TreeDocument) {
        self.restore_candidate = Some(doc);
        self.mode = Mode::Restore;
    }

    /// Accept the saved tree. Restoring is not itself a change worth saving.
    pub fn restore(&mut self) {
        let Some(doc) = self.restore_candidate.take() else {
            self.mode = Mode::Edit;
            return;
        };
        self.session.replace_root(doc.root.clone());
        self.document = doc;
        self.scheduled_revision = self.session.revision();
        self.mode = Mode::Edit;
        tracing::info!("restored saved tree");
    }

    pub fn start_fresh(&mut self) {
        self.restore_candidate = None;
        self.mode = Mode::Edit;
    }

    // -----------------------------------------------------------------------
    // Focus and cursor
    // -----------------------------------------------------------------------

    pub fn focused_task(&self) -> Option<&TaskNode> {
        let id = self.session.focused_id()?;
        tree_ops::find_task(self.session.root(), id)?
            .node
            .as_task()
            .map(|t| t.as_ref())
    }

    pub fn focused_text(&self) -> Option<&str> {
        self.focused_task().map(|t| t.text())
    }

    /// Cursor clamped into the focused text, on a char boundary
    pub fn cursor(&self) -> usize {
        let text = self.focused_text().unwrap_or("");
        let mut cursor = self.edit_cursor.min(text.len());
        while !text.is_char_boundary(cursor) {
            cursor -= 1;
        }
        cursor
    }

    /// Store the current cursor under the focused task
    pub fn remember_cursor(&mut self) {
        let cursor = self.cursor();
        if let Some(id) = self.session.focused_id() {
            self.last_cursor.insert(id.to_string(), cursor);
        }
    }

    fn recalled_cursor(&self, id: &str) -> usize {
        let len = tree_ops::find_task(self.session.root(), id)
            .map(|found| found.node.text().len())
            .unwrap_or(0);
        self.last_cursor.get(id).copied().unwrap_or(len).min(len)
    }

    /// User-initiated focus, e.g. picking a task while nothing is focused
    pub fn select(&mut self, id: &str) {
        self.remember_cursor();
        self.session.handle_focus(id);
        self.edit_cursor = self.recalled_cursor(id);
    }

    pub fn blur(&mut self) {
        self.remember_cursor();
        self.session.clear_focus();
    }

    /// Settle a pending focus request against what was just drawn. Returns
    /// true when the cursor moved and the frame should be redrawn.
    pub fn confirm_focus(&mut self) -> bool {
        let rendered = &self.rendered_ids;
        let Some(request) = self.session.confirm_rendered(|id| rendered.contains(id)) else {
            return false;
        };
        self.edit_cursor = if request.cursor_to_end {
            tree_ops::find_task(self.session.root(), &request.id)
                .map(|found| found.node.text().len())
                .unwrap_or(0)
        } else {
            self.recalled_cursor(&request.id)
        };
        true
    }

    // -----------------------------------------------------------------------
    // View state
    // -----------------------------------------------------------------------

    /// Task ids in display order for the current view
    pub fn ordered_ids(&self) -> Vec<&str> {
        let root = self.session.root();
        let tasks = match self.view {
            View::Tree => tree_ops::collect_tasks(root),
            View::List => tree_ops::collect_leaves(root),
        };
        tasks.into_iter().map(|t| t.id()).collect()
    }

    pub fn toggle_view(&mut self) {
        self.view = match self.view {
            View::Tree => View::List,
            View::List => View::Tree,
        };
        self.scroll_offset = 0;
    }

    pub fn zoom_in(&mut self) {
        self.document.zoom_in();
        self.view_dirty = true;
    }

    pub fn zoom_out(&mut self) {
        self.document.zoom_out();
        self.view_dirty = true;
    }

    /// Shift the tree sideways by `steps` pan steps
    pub fn pan(&mut self, steps: f64) {
        self.document.pan(steps * PAN_STEP, 0.0);
        self.document.view_offset.x = self.document.view_offset.x.clamp(0.0, MAX_PAN);
        self.view_dirty = true;
    }

    pub fn reset_view(&mut self) {
        self.document.reset_view();
        self.view_dirty = true;
    }

    /// Indent per depth level at the current zoom
    pub fn indent_width(&self) -> usize {
        let zoom = clamp_zoom(self.document.zoom);
        (f64::from(self.indent) * zoom).round().max(1.0) as usize
    }

    /// Left margin from panning
    pub fn pan_margin(&self) -> usize {
        self.document.view_offset.x.clamp(0.0, MAX_PAN).round() as usize
    }

    pub fn previews(&self) -> Vec<PreviewRequest> {
        self.focused_text()
            .map(url::preview_requests)
            .unwrap_or_default()
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    // -----------------------------------------------------------------------
    // Saving
    // -----------------------------------------------------------------------

    /// Tree plus view state as it should be written
    pub fn snapshot(&self) -> TreeDocument {
        let mut doc = self.document.clone();
        doc.root = self.session.root().clone();
        doc
    }

    /// Queue a save when the tree or the view changed since the last one
    pub fn schedule_save(&mut self, now: Instant) {
        let revision = self.session.revision();
        if revision == self.scheduled_revision && !self.view_dirty {
            return;
        }
        self.autosave.schedule(self.snapshot(), now);
        self.scheduled_revision = revision;
        self.view_dirty = false;
    }

    /// Per-loop housekeeping: queue changes, write when the delay is up
    pub fn tick(&mut self, now: Instant, store: &dyn DocumentStore) {
        self.schedule_save(now);
        self.autosave.poll(now, store);
    }

    /// Queue whatever changed and write it immediately
    pub fn flush(&mut self, store: &dyn DocumentStore) {
        self.schedule_save(Instant::now());
        self.autosave.flush(store);
    }
}

/// Run the TUI application
pub fn run(opts: RunOptions) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileStore::new(&opts.data_path);
    let images_dir = config_io::resolve_images_dir(&opts.data_path, &opts.config);
    let mut app = App::new(EditorSession::fresh(), &opts.config, images_dir);

    if !opts.fresh {
        match store.load() {
            Ok(Some(doc)) => app.offer_restore(doc),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "could not read saved tree");
                app.set_message(format!("could not read saved tree: {}", e));
            }
        }
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app, &store);

    app.flush(&store);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    store: &dyn DocumentStore,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;
        if app.confirm_focus() {
            terminal.draw(|frame| render::render(frame, app))?;
        }

        if event::poll(Duration::from_millis(250))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
        }

        app.tick(Instant::now(), store);

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
