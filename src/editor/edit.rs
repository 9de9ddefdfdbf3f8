use chrono::Utc;

use crate::editor::keyboard::FocusChange;
use crate::io::images::{ImageError, ImageUploader};
use crate::model::task::{TaskImage, TaskNode, TaskRoot};
use crate::ops::ids::{IdSource, fresh_id};
use crate::ops::tree_ops::{TaskPatch, add_child, add_image, find_task, remove_task, update_task};

/// Characters that turn an edit into "create a child with the rest"
const CHILD_MARKERS: [char; 2] = [' ', '\u{3000}'];

/// A tree change together with the focus move it asks for
#[derive(Debug, Clone)]
pub struct Edit {
    pub root: TaskRoot,
    pub focus: FocusChange,
}

impl Edit {
    fn unchanged(root: &TaskRoot) -> Self {
        Edit {
            root: root.clone(),
            focus: FocusChange::Keep,
        }
    }
}

/// Store new text for `task_id`.
///
/// Text starting with a space (ASCII or ideographic) is not stored on the
/// task: a new child is created with the text minus that first character,
/// and focus moves to it with the cursor at the end.
pub fn text_change(root: &TaskRoot, task_id: &str, text: &str, ids: &mut dyn IdSource) -> Edit {
    if find_task(root, task_id).is_none() {
        return Edit::unchanged(root);
    }
    if let Some(rest) = text.strip_prefix(CHILD_MARKERS) {
        let id = fresh_id(root, ids);
        return Edit {
            root: add_child(root, task_id, TaskNode::new(id.clone(), rest)),
            focus: FocusChange::Move {
                id,
                cursor_to_end: true,
            },
        };
    }
    Edit {
        root: update_task(root, task_id, &TaskPatch::text(text)),
        focus: FocusChange::Keep,
    }
}

/// Append an empty child and focus it
pub fn add_child_task(root: &TaskRoot, task_id: &str, ids: &mut dyn IdSource) -> Edit {
    if find_task(root, task_id).is_none() {
        return Edit::unchanged(root);
    }
    let id = fresh_id(root, ids);
    Edit {
        root: add_child(root, task_id, TaskNode::empty(id.clone())),
        focus: FocusChange::Move {
            id,
            cursor_to_end: false,
        },
    }
}

/// Remove a task and its subtree. The root is never removed.
pub fn delete_task(root: &TaskRoot, task_id: &str) -> TaskRoot {
    match find_task(root, task_id) {
        Some(found) if found.parent.is_some() => remove_task(root, task_id),
        _ => root.clone(),
    }
}

/// Upload `bytes` through `uploader` and attach the result to `task_id`.
///
/// Nothing in the tree changes unless the upload succeeds.
pub fn attach_image(
    root: &TaskRoot,
    task_id: &str,
    bytes: &[u8],
    extension: &str,
    uploader: &dyn ImageUploader,
    ids: &mut dyn IdSource,
) -> Result<TaskRoot, ImageError> {
    let task = find_task(root, task_id)
        .and_then(|found| found.node.as_task())
        .ok_or_else(|| ImageError::TaskNotFound(task_id.to_string()))?;
    let sequence = task.images().len() + 1;
    let uploaded = uploader.upload(task_id, bytes, extension, sequence)?;
    tracing::info!(task = task_id, key = %uploaded.storage_key, "image attached");
    let image = TaskImage {
        id: ids.next_id(),
        storage_key: uploaded.storage_key,
        url: uploaded.url,
        uploaded_at: Utc::now(),
    };
    Ok(add_image(root, task_id, image))
}
