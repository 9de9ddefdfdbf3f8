use crate::model::task::{TaskNode, TaskRoot};
use crate::ops::ids::{IdSource, fresh_id};
use crate::ops::tree_ops::{
    DropPosition, add_child, find_task, insert_sibling, move_task, remove_task,
};

/// Keys the interpreter cares about. Everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Tab,
    Backspace,
    Up,
    Down,
    Left,
    Right,
    Char(char),
    Other,
}

/// A key event as delivered by the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub shift: bool,
    pub alt: bool,
    /// A multi-keystroke composition is in progress
    pub composing: bool,
}

impl KeyPress {
    pub fn plain(key: Key) -> Self {
        KeyPress {
            key,
            shift: false,
            alt: false,
            composing: false,
        }
    }

    pub fn shift(key: Key) -> Self {
        KeyPress {
            shift: true,
            ..KeyPress::plain(key)
        }
    }

    pub fn alt(key: Key) -> Self {
        KeyPress {
            alt: true,
            ..KeyPress::plain(key)
        }
    }
}

/// The focused task's input: current content and cursor byte offset
#[derive(Debug, Clone, Copy)]
pub struct TextField<'a> {
    pub value: &'a str,
    pub cursor: usize,
}

impl<'a> TextField<'a> {
    pub fn new(value: &'a str, cursor: usize) -> Self {
        TextField { value, cursor }
    }

    fn before_cursor(&self) -> &'a str {
        self.value.get(..self.cursor).unwrap_or(self.value)
    }

    fn after_cursor(&self) -> &'a str {
        self.value.get(self.cursor..).unwrap_or("")
    }

    pub fn on_first_line(&self) -> bool {
        !self.before_cursor().contains('\n')
    }

    pub fn on_last_line(&self) -> bool {
        !self.after_cursor().contains('\n')
    }
}

/// What should happen to focus after a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusChange {
    Keep,
    Move { id: String, cursor_to_end: bool },
    Clear,
}

impl FocusChange {
    fn to(id: impl Into<String>) -> Self {
        FocusChange::Move {
            id: id.into(),
            cursor_to_end: false,
        }
    }
}

/// Result of interpreting one key
#[derive(Debug, Clone)]
pub struct KeyOutcome {
    /// New tree, if the key changed the structure
    pub root: Option<TaskRoot>,
    pub focus: FocusChange,
    /// The key was consumed; the shell must not apply its default editing
    pub handled: bool,
}

impl KeyOutcome {
    fn ignored() -> Self {
        KeyOutcome {
            root: None,
            focus: FocusChange::Keep,
            handled: false,
        }
    }

    fn consumed() -> Self {
        KeyOutcome {
            handled: true,
            ..KeyOutcome::ignored()
        }
    }

    fn focus(focus: FocusChange) -> Self {
        KeyOutcome {
            root: None,
            focus,
            handled: true,
        }
    }

    fn edit(root: TaskRoot, focus: FocusChange) -> Self {
        KeyOutcome {
            root: Some(root),
            focus,
            handled: true,
        }
    }
}

/// Interpret `key` pressed while `task_id` is focused.
///
/// Pure with respect to the tree: the caller swaps in `outcome.root` and
/// applies `outcome.focus`. An unknown `task_id` yields an ignored outcome.
pub fn handle_key(
    root: &TaskRoot,
    task_id: &str,
    key: &KeyPress,
    field: &TextField,
    ids: &mut dyn IdSource,
) -> KeyOutcome {
    let Some(found) = find_task(root, task_id) else {
        return KeyOutcome::ignored();
    };
    let Some(parent) = found.parent else {
        // Root is not an editable task
        return KeyOutcome::ignored();
    };
    let siblings = parent.children();
    let index = found.index;
    let prev = index.checked_sub(1).and_then(|i| siblings.get(i));
    let next = siblings.get(index + 1);

    if key.alt {
        let moved = match key.key {
            Key::Up => prev.map(|p| move_task(root, task_id, p.id(), DropPosition::Before)),
            Key::Down => next.map(|n| move_task(root, task_id, n.id(), DropPosition::After)),
            Key::Right => prev.map(|p| move_task(root, task_id, p.id(), DropPosition::Child)),
            Key::Left if !parent.is_root() => {
                Some(move_task(root, task_id, parent.id(), DropPosition::After))
            }
            _ => return KeyOutcome::ignored(),
        };
        return match moved {
            Some(Ok(new_root)) => KeyOutcome::edit(new_root, FocusChange::Keep),
            Some(Err(err)) => {
                tracing::debug!(id = task_id, %err, "keyboard move rejected");
                KeyOutcome::consumed()
            }
            None => KeyOutcome::consumed(),
        };
    }

    match key.key {
        Key::Enter if !key.shift && !key.composing => {
            let new_id = fresh_id(root, ids);
            let new_root = insert_sibling(root, parent.id(), index, TaskNode::empty(new_id.clone()));
            KeyOutcome::edit(new_root, FocusChange::to(new_id))
        }
        Key::Tab if key.shift => {
            if parent.is_root() {
                KeyOutcome::consumed()
            } else {
                KeyOutcome::focus(FocusChange::to(parent.id()))
            }
        }
        Key::Tab => {
            let new_id = fresh_id(root, ids);
            let new_root = add_child(root, task_id, TaskNode::empty(new_id.clone()));
            KeyOutcome::edit(new_root, FocusChange::to(new_id))
        }
        Key::Backspace if field.value.is_empty() => {
            // Pick the next focus from the pre-removal layout
            let focus = if let Some(p) = prev {
                FocusChange::to(p.id())
            } else if let Some(s) = siblings.get(1) {
                FocusChange::to(s.id())
            } else if parent.is_root() {
                FocusChange::Clear
            } else {
                FocusChange::to(parent.id())
            };
            KeyOutcome::edit(remove_task(root, task_id), focus)
        }
        Key::Up if field.on_first_line() => match prev {
            Some(p) => KeyOutcome::focus(FocusChange::to(p.id())),
            None => KeyOutcome::ignored(),
        },
        Key::Down if field.on_last_line() => match next {
            Some(n) => KeyOutcome::focus(FocusChange::to(n.id())),
            None => KeyOutcome::ignored(),
        },
        _ => KeyOutcome::ignored(),
    }
}
