use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde_json::Value;
use tempfile::NamedTempFile;

use crate::model::document::TreeDocument;
use crate::ops::tree_ops::duplicate_ids;

/// File name of the autosaved document inside the data directory
pub const DATA_FILE_NAME: &str = "tasktree-data.json";

/// Error type for document I/O
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: io::Error,
    },
    #[error("invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("invalid file format: {0}")]
    InvalidFormat(String),
}

// ---------------------------------------------------------------------------
// Parsing and validation
// ---------------------------------------------------------------------------

/// Parse and validate a document.
///
/// Rejects a missing `root`, a missing or empty `root.id`, a `root.children`
/// that is not an array, and any task id used twice.
pub fn parse_document(text: &str) -> Result<TreeDocument, DocumentError> {
    let value: Value = serde_json::from_str(text)?;
    check_shape(&value)?;
    let doc: TreeDocument = serde_json::from_value(value)?;

    let dups = duplicate_ids(&doc.root);
    if !dups.is_empty() {
        return Err(DocumentError::InvalidFormat(format!(
            "duplicate task ids: {}",
            dups.join(", ")
        )));
    }
    Ok(doc)
}

fn check_shape(value: &Value) -> Result<(), DocumentError> {
    let invalid = |msg: &str| DocumentError::InvalidFormat(msg.to_string());
    let root = value
        .get("root")
        .filter(|r| r.is_object())
        .ok_or_else(|| invalid("missing root"))?;
    root.get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| invalid("root has no id"))?;
    root.get("children")
        .filter(|c| c.is_array())
        .ok_or_else(|| invalid("root.children is not an array"))?;
    Ok(())
}

/// Pretty-printed JSON, the same layout for autosave and export
pub fn serialize_document(doc: &TreeDocument) -> Result<String, DocumentError> {
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Write a file atomically using a temp file in the same directory
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

/// Load/save collaborator for the autosaved document
pub trait DocumentStore {
    /// `Ok(None)` when nothing has been saved yet
    fn load(&self) -> Result<Option<TreeDocument>, DocumentError>;
    fn save(&self, doc: &TreeDocument) -> Result<(), DocumentError>;
}

/// A document kept in a single JSON file
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentStore for FileStore {
    fn load(&self) -> Result<Option<TreeDocument>, DocumentError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no saved document");
            return Ok(None);
        }
        read_document(&self.path).map(Some)
    }

    fn save(&self, doc: &TreeDocument) -> Result<(), DocumentError> {
        write_document(&self.path, doc)?;
        tracing::debug!(path = %self.path.display(), "document saved");
        Ok(())
    }
}

fn read_document(path: &Path) -> Result<TreeDocument, DocumentError> {
    let text = fs::read_to_string(path).map_err(|e| DocumentError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_document(&text)
}

fn write_document(path: &Path, doc: &TreeDocument) -> Result<(), DocumentError> {
    let json = serialize_document(doc)?;
    let write_err = |e| DocumentError::WriteError {
        path: path.to_path_buf(),
        source: e,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    atomic_write(path, json.as_bytes()).map_err(write_err)
}

// ---------------------------------------------------------------------------
// Export / import
// ---------------------------------------------------------------------------

/// `task-tree-YYYY-MM-DD.json`
pub fn default_export_name(date: NaiveDate) -> String {
    format!("task-tree-{}.json", date.format("%Y-%m-%d"))
}

pub fn export_document(doc: &TreeDocument, path: &Path) -> Result<(), DocumentError> {
    write_document(path, doc)?;
    tracing::info!(path = %path.display(), "document exported");
    Ok(())
}

/// Read and validate a document from a user-chosen file. Nothing is
/// replaced until this succeeds.
pub fn import_document(path: &Path) -> Result<TreeDocument, DocumentError> {
    let doc = read_document(path)?;
    tracing::info!(path = %path.display(), "document imported");
    Ok(doc)
}
