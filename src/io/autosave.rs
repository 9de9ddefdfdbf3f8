use std::fmt;
use std::time::{Duration, Instant};

use chrono::Utc;

use crate::io::document_io::DocumentStore;
use crate::model::document::TreeDocument;

/// Default delay between the last change and the write
pub const DEFAULT_DELAY: Duration = Duration::from_millis(1000);

/// Save state shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    Pending,
    Error,
}

impl fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SaveStatus::Saved => "saved",
            SaveStatus::Pending => "pending",
            SaveStatus::Error => "save failed",
        };
        f.write_str(label)
    }
}

/// Debounced autosave. Each `schedule` restarts the delay; the snapshot is
/// written on the first `poll` at or after the deadline.
#[derive(Debug)]
pub struct Autosave {
    delay: Duration,
    pending: Option<(TreeDocument, Instant)>,
    status: SaveStatus,
}

impl Autosave {
    pub fn new(delay: Duration) -> Self {
        Autosave {
            delay,
            pending: None,
            status: SaveStatus::Saved,
        }
    }

    pub fn status(&self) -> SaveStatus {
        self.status
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Queue `doc`, replacing any snapshot still waiting
    pub fn schedule(&mut self, doc: TreeDocument, now: Instant) {
        self.pending = Some((doc, now + self.delay));
        self.status = SaveStatus::Pending;
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Write the pending snapshot if its deadline has passed. Returns true
    /// when a write was attempted.
    pub fn poll(&mut self, now: Instant, store: &dyn DocumentStore) -> bool {
        let due = matches!(&self.pending, Some((_, deadline)) if now >= *deadline);
        due && self.flush(store)
    }

    /// Write the pending snapshot now, whatever the deadline
    pub fn flush(&mut self, store: &dyn DocumentStore) -> bool {
        let Some((mut doc, _)) = self.pending.take() else {
            return false;
        };
        doc.saved_at = Utc::now();
        self.status = match store.save(&doc) {
            Ok(()) => SaveStatus::Saved,
            Err(e) => {
                tracing::warn!(error = %e, "autosave failed");
                SaveStatus::Error
            }
        };
        true
    }
}

impl Default for Autosave {
    fn default() -> Self {
        Autosave::new(DEFAULT_DELAY)
    }
}
