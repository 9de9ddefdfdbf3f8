/// A focus move waiting for its target to show up on screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusRequest {
    pub id: String,
    /// Place the text cursor after the existing content
    pub cursor_to_end: bool,
}

/// Tracks the focused task and the pending programmatic focus move.
///
/// Focus moves are two-phase: `focus_task` records the intent immediately,
/// and the presentation layer calls `confirm_rendered` after its next render
/// pass to learn whether the target now exists and where the cursor goes.
#[derive(Debug, Default, Clone)]
pub struct FocusController {
    focused: Option<String>,
    pending: Option<FocusRequest>,
}

impl FocusController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focused_id(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    pub fn pending(&self) -> Option<&FocusRequest> {
        self.pending.as_ref()
    }

    /// Request focus on `id`. A later request replaces an earlier one.
    pub fn focus_task(&mut self, id: impl Into<String>, cursor_to_end: bool) {
        let id = id.into();
        self.focused = Some(id.clone());
        self.pending = Some(FocusRequest { id, cursor_to_end });
    }

    /// Called once per render pass. Returns the request if its target has
    /// been rendered; a request whose target never materialized is dropped.
    pub fn confirm_rendered(&mut self, is_rendered: impl Fn(&str) -> bool) -> Option<FocusRequest> {
        let request = self.pending.take()?;
        if is_rendered(&request.id) {
            Some(request)
        } else {
            tracing::debug!(id = %request.id, "focus target not rendered, dropping request");
            None
        }
    }

    /// The user focused a task directly (click, tab into it)
    pub fn handle_focus(&mut self, id: impl Into<String>) {
        self.focused = Some(id.into());
    }

    pub fn clear(&mut self) {
        self.focused = None;
        self.pending = None;
    }
}
