use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::io::images::{self, DirectoryImageStore};
use crate::tui::app::{App, Mode};

/// Startup question: restore the saved tree or start over
pub(super) fn handle_restore(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.restore(),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.start_fresh(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }
        _ => {}
    }
}

/// Image path input for the focused task
pub(super) fn handle_attach(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.attach_input.clear();
            app.mode = Mode::Edit;
        }
        KeyCode::Enter => {
            app.mode = Mode::Edit;
            attach(app);
        }
        KeyCode::Backspace => {
            app.attach_input.pop();
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.attach_input.push(c);
        }
        _ => {}
    }
}

fn attach(app: &mut App) {
    let input = std::mem::take(&mut app.attach_input);
    let path = PathBuf::from(input.trim());
    let Some(id) = app.session.focused_id().map(str::to_string) else {
        return;
    };

    let uploader = DirectoryImageStore::new(app.images_dir.clone());
    let result = images::read_image(&path).and_then(|bytes| {
        let extension = images::image_extension(&path);
        app.session
            .attach_image(&id, &bytes, &extension, &uploader)
    });
    match result {
        Ok(()) => app.set_message(format!("attached {}", path.display())),
        Err(e) => {
            tracing::warn!(task = %id, error = %e, "image attach failed");
            app.set_message(format!("attach failed: {}", e));
        }
    }
}
