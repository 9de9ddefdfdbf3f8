mod edit;
mod prompt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::editor::{Key, KeyPress};

use super::app::{App, Mode};

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }

    match app.mode {
        Mode::Restore => prompt::handle_restore(app, key),
        Mode::Attach => prompt::handle_attach(app, key),
        Mode::Edit => edit::handle_edit(app, key),
    }
}

/// The interpreter's view of a terminal key. Terminals report no IME
/// composition, so `composing` is always false here.
fn to_key_press(key: &KeyEvent) -> KeyPress {
    let code = match key.code {
        KeyCode::Enter => Key::Enter,
        KeyCode::Tab | KeyCode::BackTab => Key::Tab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Char(c) => Key::Char(c),
        _ => Key::Other,
    };
    KeyPress {
        key: code,
        shift: key.modifiers.contains(KeyModifiers::SHIFT) || key.code == KeyCode::BackTab,
        alt: key.modifiers.contains(KeyModifiers::ALT),
        composing: false,
    }
}
