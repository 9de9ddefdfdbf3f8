use crate::model::task::TaskRoot;
use crate::ops::tree_ops::{DropPosition, move_task};

/// Modifier keys held when a drag starts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerModifiers {
    pub ctrl: bool,
    pub meta: bool,
}

impl PointerModifiers {
    /// Ctrl/Meta pointer-down pans the view instead of dragging
    pub fn pans(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Vertical extent of a rendered task
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub top: f64,
    pub height: f64,
}

/// Element under the finger, resolved by the shell on every touch move
#[derive(Debug, Clone, PartialEq)]
pub struct TouchHit {
    pub target_id: String,
    pub bounds: Bounds,
    pub pointer_y: f64,
}

/// Top third before, bottom third after, middle third child
pub fn classify_drop(bounds: Bounds, pointer_y: f64) -> DropPosition {
    let y = pointer_y - bounds.top;
    if y < bounds.height / 3.0 {
        DropPosition::Before
    } else if y > bounds.height * 2.0 / 3.0 {
        DropPosition::After
    } else {
        DropPosition::Child
    }
}

/// Drag-and-drop and touch-drag state for reordering tasks.
///
/// Every rejected or invalid action resets to idle without touching the
/// tree; none of them is an error.
#[derive(Debug, Default, Clone)]
pub struct DragController {
    dragged: Option<String>,
    over: Option<String>,
    position: Option<DropPosition>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dragged_id(&self) -> Option<&str> {
        self.dragged.as_deref()
    }

    pub fn over_id(&self) -> Option<&str> {
        self.over.as_deref()
    }

    pub fn position(&self) -> Option<DropPosition> {
        self.position
    }

    pub fn is_dragging(&self) -> bool {
        self.dragged.is_some()
    }

    /// Returns false when the pointer-down belongs to panning
    pub fn drag_start(&mut self, id: impl Into<String>, modifiers: PointerModifiers) -> bool {
        if modifiers.pans() {
            return false;
        }
        self.dragged = Some(id.into());
        self.over = None;
        self.position = None;
        true
    }

    pub fn drag_over(&mut self, target_id: &str, bounds: Bounds, pointer_y: f64) {
        if self.dragged.as_deref() == Some(target_id) {
            return;
        }
        self.over = Some(target_id.to_string());
        self.position = Some(classify_drop(bounds, pointer_y));
    }

    pub fn drag_leave(&mut self) {
        self.over = None;
        self.position = None;
    }

    /// Drop on `target_id`. Without a recorded position the task lands
    /// after the target. Returns the new tree, or None if nothing moved.
    pub fn drop(&mut self, root: &TaskRoot, target_id: &str) -> Option<TaskRoot> {
        let dragged = self.dragged.take();
        let position = self.position.unwrap_or(DropPosition::After);
        self.reset();
        let dragged = dragged?;
        apply_move(root, &dragged, target_id, position)
    }

    pub fn touch_start(&mut self, id: impl Into<String>) {
        self.dragged = Some(id.into());
        self.over = None;
        self.position = None;
    }

    pub fn touch_move(&mut self, hit: Option<TouchHit>) {
        if self.dragged.is_none() {
            return;
        }
        match hit {
            Some(hit) => {
                if self.dragged.as_deref() != Some(hit.target_id.as_str()) {
                    self.position = Some(classify_drop(hit.bounds, hit.pointer_y));
                    self.over = Some(hit.target_id);
                }
            }
            None => self.drag_leave(),
        }
    }

    /// Finish a touch drag using the last target and position
    pub fn touch_end(&mut self, root: &TaskRoot) -> Option<TaskRoot> {
        let dragged = self.dragged.take();
        let over = self.over.take();
        let position = self.position.take();
        self.reset();
        match (dragged, over, position) {
            (Some(dragged), Some(over), Some(position)) => {
                apply_move(root, &dragged, &over, position)
            }
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        self.dragged = None;
        self.over = None;
        self.position = None;
    }
}

fn apply_move(root: &TaskRoot, dragged: &str, target: &str, position: DropPosition) -> Option<TaskRoot> {
    match move_task(root, dragged, target, position) {
        Ok(moved) => {
            tracing::debug!(dragged, target, ?position, "task moved");
            Some(moved)
        }
        Err(err) => {
            tracing::debug!(dragged, target, %err, "drop ignored");
            None
        }
    }
}
