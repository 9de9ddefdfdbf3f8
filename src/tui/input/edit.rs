use std::ops::Range;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::editor::TextField;
use crate::tui::app::{App, Mode};
use crate::util::unicode::{
    line_bounds, move_vertically, next_grapheme_boundary, prev_grapheme_boundary,
};

use super::to_key_press;

pub(super) fn handle_edit(app: &mut App, key: KeyEvent) {
    app.status_message = None;

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        handle_ctrl(app, key);
        return;
    }
    if key.code == KeyCode::Esc {
        app.blur();
        return;
    }

    let Some(id) = app.session.focused_id().map(str::to_string) else {
        handle_unfocused(app, key);
        return;
    };
    let Some(text) = app.focused_text().map(str::to_string) else {
        // Focus points at a task that is gone
        app.session.clear_focus();
        handle_unfocused(app, key);
        return;
    };

    let cursor = app.cursor();
    app.remember_cursor();
    let field = TextField::new(&text, cursor);
    if app.session.key(&id, &to_key_press(&key), &field) {
        return;
    }
    edit_text(app, &id, &text, cursor, key);
}

/// Default editing for keys the interpreter left alone
fn edit_text(app: &mut App, id: &str, text: &str, cursor: usize, key: KeyEvent) {
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    match key.code {
        // Shift+Enter and Alt+Enter reach here; plain Enter never does
        KeyCode::Enter => splice(app, id, text, cursor..cursor, "\n"),
        KeyCode::Char(c) if !alt => {
            let mut buf = [0u8; 4];
            splice(app, id, text, cursor..cursor, c.encode_utf8(&mut buf));
        }
        KeyCode::Backspace => {
            if let Some(prev) = prev_grapheme_boundary(text, cursor) {
                splice(app, id, text, prev..cursor, "");
            }
        }
        KeyCode::Delete => {
            if let Some(next) = next_grapheme_boundary(text, cursor) {
                splice(app, id, text, cursor..next, "");
            }
        }
        KeyCode::Left => {
            if let Some(prev) = prev_grapheme_boundary(text, cursor) {
                app.edit_cursor = prev;
            }
        }
        KeyCode::Right => {
            if let Some(next) = next_grapheme_boundary(text, cursor) {
                app.edit_cursor = next;
            }
        }
        KeyCode::Home => app.edit_cursor = line_bounds(text, cursor).0,
        KeyCode::End => app.edit_cursor = line_bounds(text, cursor).1,
        KeyCode::Up | KeyCode::Down => {
            if let Some(offset) = move_vertically(text, cursor, key.code == KeyCode::Up) {
                app.edit_cursor = offset;
            }
        }
        _ => {}
    }
}

/// Replace `range` of the focused text and hand the result to the session.
/// When the edit split off a child, focus has moved and the cursor is left
/// for the focus request to place.
fn splice(app: &mut App, id: &str, text: &str, range: Range<usize>, insert: &str) {
    let mut new_text = String::with_capacity(text.len() + insert.len());
    new_text.push_str(&text[..range.start]);
    new_text.push_str(insert);
    new_text.push_str(&text[range.end..]);

    app.session.text_change(id, &new_text);
    if app.session.focused_id() == Some(id) {
        app.edit_cursor = range.start + insert.len();
    }
}

fn handle_ctrl(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('c') | KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('l') => app.toggle_view(),
        KeyCode::Char('n') => {
            app.remember_cursor();
            app.session.add_top_level();
        }
        KeyCode::Char('x') => toggle_focused(app),
        KeyCode::Char('d') => delete_focused(app),
        KeyCode::Char('o') => {
            if app.session.focused_id().is_some() {
                app.attach_input.clear();
                app.mode = Mode::Attach;
            }
        }
        KeyCode::Up | KeyCode::Char('=') | KeyCode::Char('+') => app.zoom_in(),
        KeyCode::Down | KeyCode::Char('-') => app.zoom_out(),
        KeyCode::Left => app.pan(-1.0),
        KeyCode::Right => app.pan(1.0),
        KeyCode::Char('0') => app.reset_view(),
        _ => {}
    }
}

fn toggle_focused(app: &mut App) {
    let Some(task) = app.focused_task() else {
        return;
    };
    let id = task.id().to_string();
    if task.has_children() {
        app.set_message("completion follows the subtasks");
        return;
    }
    app.session.toggle(&id);
}

fn delete_focused(app: &mut App) {
    let Some(id) = app.session.focused_id().map(str::to_string) else {
        return;
    };
    app.last_cursor.remove(&id);
    if app.session.delete(&id) {
        app.set_message("task deleted");
    }
}

/// Keys while no task is focused: pick one, add one, or adjust the view
fn handle_unfocused(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Enter | KeyCode::Tab => {
            let first = app.ordered_ids().first().map(|id| id.to_string());
            match first {
                Some(id) => app.select(&id),
                None if key.code == KeyCode::Enter => app.session.add_top_level(),
                None => {}
            }
        }
        KeyCode::Up | KeyCode::Char('k') => {
            let last = app.ordered_ids().last().map(|id| id.to_string());
            if let Some(id) = last {
                app.select(&id);
            }
        }
        KeyCode::Char('n') => app.session.add_top_level(),
        KeyCode::Char('v') => app.toggle_view(),
        KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
        KeyCode::Char('-') => app.zoom_out(),
        KeyCode::Char('0') => app.reset_view(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TaskNode, TaskRoot};
    use crate::ops::tree_ops::find_task;
    use crate::tui::app::View;
    use crate::tui::render::test_helpers::app_with_root;
    use pretty_assertions::assert_eq;

    fn press(app: &mut App, code: KeyCode) {
        handle_edit(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn press_mod(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
        handle_edit(app, KeyEvent::new(code, modifiers));
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn text_of<'a>(app: &'a App, id: &str) -> &'a str {
        find_task(app.session.root(), id).unwrap().node.text()
    }

    /// Render-confirm step the event loop performs after each key
    fn settle(app: &mut App) {
        app.rendered_ids = app.ordered_ids().iter().map(|s| s.to_string()).collect();
        app.confirm_focus();
    }

    fn two_tasks() -> TaskRoot {
        TaskRoot::new(vec![TaskNode::new("a", "alpha"), TaskNode::new("b", "beta")])
    }

    #[test]
    fn test_typing_edits_the_focused_task() {
        let mut app = app_with_root(two_tasks());
        app.select("a");
        type_str(&mut app, "!?");
        assert_eq!(text_of(&app, "a"), "alpha!?");
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(text_of(&app, "a"), "alpha?");
        assert_eq!(app.cursor(), 5);
    }

    #[test]
    fn test_enter_then_typing_fills_the_new_sibling() {
        let mut app = app_with_root(two_tasks());
        app.select("a");
        press(&mut app, KeyCode::Enter);
        settle(&mut app);
        type_str(&mut app, "new");

        let ids: Vec<_> = app.session.root().children().iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec!["a", "n1", "b"]);
        assert_eq!(text_of(&app, "n1"), "new");
    }

    #[test]
    fn test_leading_space_splits_off_a_child() {
        let mut app = app_with_root(two_tasks());
        app.select("a");
        press(&mut app, KeyCode::Home);
        press(&mut app, KeyCode::Char(' '));
        settle(&mut app);

        assert_eq!(text_of(&app, "a"), "alpha");
        assert_eq!(text_of(&app, "n1"), "alpha");
        assert_eq!(app.session.focused_id(), Some("n1"));
        assert_eq!(app.cursor(), 5);
    }

    #[test]
    fn test_shift_enter_inserts_a_newline() {
        let mut app = app_with_root(two_tasks());
        app.select("b");
        press_mod(&mut app, KeyCode::Enter, KeyModifiers::SHIFT);
        type_str(&mut app, "x");
        assert_eq!(text_of(&app, "b"), "beta\nx");

        // Up inside multi-line text stays in the task
        press(&mut app, KeyCode::Up);
        assert_eq!(app.session.focused_id(), Some("b"));
        assert_eq!(app.cursor(), 1);
    }

    #[test]
    fn test_arrows_move_between_siblings_at_the_edges() {
        let mut app = app_with_root(two_tasks());
        app.select("a");
        press(&mut app, KeyCode::Down);
        settle(&mut app);
        assert_eq!(app.session.focused_id(), Some("b"));
        press(&mut app, KeyCode::Up);
        settle(&mut app);
        assert_eq!(app.session.focused_id(), Some("a"));
    }

    #[test]
    fn test_backspace_on_empty_task_removes_it() {
        let mut app = app_with_root(TaskRoot::new(vec![
            TaskNode::new("a", "alpha"),
            TaskNode::empty("b"),
        ]));
        app.select("b");
        press(&mut app, KeyCode::Backspace);
        settle(&mut app);
        assert_eq!(app.session.root().children().len(), 1);
        assert_eq!(app.session.focused_id(), Some("a"));
    }

    #[test]
    fn test_alt_right_indents_under_previous_sibling() {
        let mut app = app_with_root(two_tasks());
        app.select("b");
        press_mod(&mut app, KeyCode::Right, KeyModifiers::ALT);
        let a = &app.session.root().children()[0];
        assert_eq!(a.children()[0].id(), "b");
        assert_eq!(app.session.focused_id(), Some("b"));
    }

    #[test]
    fn test_ctrl_x_toggles_leaves_only() {
        let mut app = app_with_root(TaskRoot::new(vec![
            TaskNode::new("p", "parent").with_child(TaskNode::new("c", "child")),
        ]));
        app.select("c");
        press_mod(&mut app, KeyCode::Char('x'), KeyModifiers::CONTROL);
        assert!(app.session.root().children()[0].is_completed());

        app.select("p");
        let before = app.session.revision();
        press_mod(&mut app, KeyCode::Char('x'), KeyModifiers::CONTROL);
        assert_eq!(app.session.revision(), before);
        assert_eq!(app.status_message.as_deref(), Some("completion follows the subtasks"));
    }

    #[test]
    fn test_ctrl_d_deletes_and_clears_focus() {
        let mut app = app_with_root(two_tasks());
        app.select("a");
        press_mod(&mut app, KeyCode::Char('d'), KeyModifiers::CONTROL);
        assert_eq!(app.session.root().children().len(), 1);
        assert_eq!(app.session.focused_id(), None);
    }

    #[test]
    fn test_unfocused_keys_pick_tasks_and_views() {
        let mut app = app_with_root(two_tasks());
        press(&mut app, KeyCode::Up);
        assert_eq!(app.session.focused_id(), Some("b"));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.session.focused_id(), None);

        press(&mut app, KeyCode::Char('v'));
        assert_eq!(app.view, View::List);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_enter_on_an_empty_tree_adds_a_task() {
        let mut app = app_with_root(TaskRoot::new(vec![]));
        press(&mut app, KeyCode::Enter);
        settle(&mut app);
        assert_eq!(app.session.root().children().len(), 1);
        assert_eq!(app.session.focused_id(), Some("n1"));
    }

    #[test]
    fn test_ctrl_o_opens_the_attach_prompt_only_with_focus() {
        let mut app = app_with_root(two_tasks());
        press_mod(&mut app, KeyCode::Char('o'), KeyModifiers::CONTROL);
        assert_eq!(app.mode, Mode::Edit);
        app.select("a");
        press_mod(&mut app, KeyCode::Char('o'), KeyModifiers::CONTROL);
        assert_eq!(app.mode, Mode::Attach);
    }
}
