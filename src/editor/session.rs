use crate::editor::drag::{Bounds, DragController, PointerModifiers, TouchHit};
use crate::editor::edit::{self, Edit};
use crate::editor::focus::{FocusController, FocusRequest};
use crate::editor::keyboard::{self, FocusChange, KeyPress, TextField};
use crate::io::images::{ImageError, ImageUploader};
use crate::model::task::TaskRoot;
use crate::ops::ids::{IdSource, RandomIds};
use crate::ops::tree_ops;

/// One editing session: the current tree plus focus and drag state.
///
/// Every command runs a pure tree operation and swaps the result in. The
/// revision counter goes up whenever the tree actually changes, which is
/// what the shell watches to schedule saves.
pub struct EditorSession {
    root: TaskRoot,
    focus: FocusController,
    drag: DragController,
    ids: Box<dyn IdSource>,
    revision: u64,
}

impl EditorSession {
    pub fn new(root: TaskRoot, ids: Box<dyn IdSource>) -> Self {
        EditorSession {
            root,
            focus: FocusController::new(),
            drag: DragController::new(),
            ids,
            revision: 0,
        }
    }

    /// Session over an existing tree with random ids
    pub fn with_root(root: TaskRoot) -> Self {
        EditorSession::new(root, Box::new(RandomIds::new()))
    }

    /// Session over the default single-task tree
    pub fn fresh() -> Self {
        EditorSession::with_root(TaskRoot::initial())
    }

    pub fn root(&self) -> &TaskRoot {
        &self.root
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn focused_id(&self) -> Option<&str> {
        self.focus.focused_id()
    }

    pub fn focus(&self) -> &FocusController {
        &self.focus
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    /// Swap in a whole new tree (restore, import). Focus and drag reset.
    pub fn replace_root(&mut self, root: TaskRoot) {
        self.root = root;
        self.focus.clear();
        self.drag.reset();
        self.revision += 1;
    }

    // -----------------------------------------------------------------------
    // Focus
    // -----------------------------------------------------------------------

    pub fn focus_task(&mut self, id: &str, cursor_to_end: bool) {
        self.focus.focus_task(id, cursor_to_end);
    }

    pub fn handle_focus(&mut self, id: &str) {
        self.focus.handle_focus(id);
    }

    pub fn clear_focus(&mut self) {
        self.focus.clear();
    }

    /// Presentation hook, called after each render pass
    pub fn confirm_rendered(&mut self, is_rendered: impl Fn(&str) -> bool) -> Option<FocusRequest> {
        self.focus.confirm_rendered(is_rendered)
    }

    fn apply_focus(&mut self, change: FocusChange) {
        match change {
            FocusChange::Keep => {}
            FocusChange::Move { id, cursor_to_end } => self.focus.focus_task(id, cursor_to_end),
            FocusChange::Clear => self.focus.clear(),
        }
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Returns true when the tree changed
    fn commit(&mut self, root: TaskRoot) -> bool {
        if root.shares_structure_with(&self.root) {
            return false;
        }
        self.root = root;
        self.revision += 1;
        true
    }

    fn apply_edit(&mut self, edit: Edit) {
        self.commit(edit.root);
        self.apply_focus(edit.focus);
    }

    /// Feed a key to the interpreter. Returns whether it was consumed.
    pub fn key(&mut self, task_id: &str, key: &KeyPress, field: &TextField) -> bool {
        let outcome = keyboard::handle_key(&self.root, task_id, key, field, self.ids.as_mut());
        if let Some(root) = outcome.root {
            self.commit(root);
        }
        self.apply_focus(outcome.focus);
        outcome.handled
    }

    pub fn text_change(&mut self, task_id: &str, text: &str) {
        let edit = edit::text_change(&self.root, task_id, text, self.ids.as_mut());
        self.apply_edit(edit);
    }

    pub fn add_child(&mut self, task_id: &str) {
        let edit = edit::add_child_task(&self.root, task_id, self.ids.as_mut());
        self.apply_edit(edit);
    }

    /// Add an empty task at the end of the top level and focus it
    pub fn add_top_level(&mut self) {
        let root_id = self.root.id().to_string();
        self.add_child(&root_id);
    }

    pub fn toggle(&mut self, task_id: &str) -> bool {
        let root = tree_ops::toggle_complete(&self.root, task_id);
        self.commit(root)
    }

    pub fn delete(&mut self, task_id: &str) -> bool {
        let root = edit::delete_task(&self.root, task_id);
        let changed = self.commit(root);
        if changed && self.focus.focused_id() == Some(task_id) {
            self.focus.clear();
        }
        changed
    }

    pub fn attach_image(
        &mut self,
        task_id: &str,
        bytes: &[u8],
        extension: &str,
        uploader: &dyn ImageUploader,
    ) -> Result<(), ImageError> {
        let root = edit::attach_image(&self.root, task_id, bytes, extension, uploader, self.ids.as_mut())?;
        self.commit(root);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Drag and touch
    // -----------------------------------------------------------------------

    pub fn drag_start(&mut self, id: &str, modifiers: PointerModifiers) -> bool {
        self.drag.drag_start(id, modifiers)
    }

    pub fn drag_over(&mut self, target_id: &str, bounds: Bounds, pointer_y: f64) {
        self.drag.drag_over(target_id, bounds, pointer_y);
    }

    pub fn drag_leave(&mut self) {
        self.drag.drag_leave();
    }

    pub fn drop_on(&mut self, target_id: &str) -> bool {
        match self.drag.drop(&self.root, target_id) {
            Some(root) => self.commit(root),
            None => false,
        }
    }

    pub fn touch_start(&mut self, id: &str) {
        self.drag.touch_start(id);
    }

    pub fn touch_move(&mut self, hit: Option<TouchHit>) {
        self.drag.touch_move(hit);
    }

    pub fn touch_end(&mut self) -> bool {
        match self.drag.touch_end(&self.root) {
            Some(root) => self.commit(root),
            None => false,
        }
    }
}
