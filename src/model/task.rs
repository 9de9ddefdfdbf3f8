use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identifier of the tree's anchor node
pub const ROOT_ID: &str = "root";

/// An image attached to a task. Field names on disk match the documents
/// written by earlier versions of the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskImage {
    pub id: String,
    /// Key under which the uploader stored the bytes
    #[serde(rename = "s3Key")]
    pub storage_key: String,
    /// URL the image can be fetched from
    #[serde(rename = "presignedUrl")]
    pub url: String,
    #[serde(rename = "uploadedAt")]
    pub uploaded_at: DateTime<Utc>,
}

/// Leaf or parent. Only leaves carry a completion flag; a parent's
/// completion is always derived from its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Leaf { completed: bool },
    /// Never empty: removing the last child turns the node back into a leaf.
    Parent { children: Vec<Arc<TaskNode>> },
}

/// A task in the hierarchy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskNode {
    id: String,
    text: String,
    images: Vec<TaskImage>,
    kind: NodeKind,
}

impl TaskNode {
    /// An incomplete leaf with the given text
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        TaskNode {
            id: id.into(),
            text: text.into(),
            images: Vec::new(),
            kind: NodeKind::Leaf { completed: false },
        }
    }

    /// An empty, incomplete leaf
    pub fn empty(id: impl Into<String>) -> Self {
        TaskNode::new(id, String::new())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn images(&self) -> &[TaskImage] {
        &self.images
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn children(&self) -> &[Arc<TaskNode>] {
        match &self.kind {
            NodeKind::Leaf { .. } => &[],
            NodeKind::Parent { children } => children,
        }
    }

    pub fn has_children(&self) -> bool {
        matches!(self.kind, NodeKind::Parent { .. })
    }

    /// Stored flag for a leaf, `None` for a parent
    pub fn completed_flag(&self) -> Option<bool> {
        match self.kind {
            NodeKind::Leaf { completed } => Some(completed),
            NodeKind::Parent { .. } => None,
        }
    }

    /// Leaf: the stored flag. Parent: every child is (recursively) completed.
    pub fn is_completed(&self) -> bool {
        match &self.kind {
            NodeKind::Leaf { completed } => *completed,
            NodeKind::Parent { children } => children.iter().all(|c| c.is_completed()),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the leaf flag. Ignored on parents.
    pub fn with_completed(mut self, completed: bool) -> Self {
        if let NodeKind::Leaf { .. } = self.kind {
            self.kind = NodeKind::Leaf { completed };
        }
        self
    }

    pub fn with_images(mut self, images: Vec<TaskImage>) -> Self {
        self.images = images;
        self
    }

    /// Builder used by tests and fixtures
    pub fn with_child(self, child: TaskNode) -> Self {
        let mut children = self.children().to_vec();
        children.push(Arc::new(child));
        self.replace_children(children)
    }

    fn replace_children(mut self, children: Vec<Arc<TaskNode>>) -> Self {
        self.kind = if children.is_empty() {
            NodeKind::Leaf { completed: false }
        } else {
            NodeKind::Parent { children }
        };
        self
    }
}

/// The tree's anchor node. Not a task itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRoot {
    id: String,
    #[serde(default)]
    text: String,
    children: Vec<Arc<TaskNode>>,
}

impl TaskRoot {
    pub fn new(children: Vec<TaskNode>) -> Self {
        TaskRoot {
            id: ROOT_ID.to_string(),
            text: "Root".to_string(),
            children: children.into_iter().map(Arc::new).collect(),
        }
    }

    /// The tree a session starts with when nothing was saved
    pub fn initial() -> Self {
        TaskRoot::new(vec![TaskNode::new("initial-task", "New task")])
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn children(&self) -> &[Arc<TaskNode>] {
        &self.children
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// True when `other` is this tree or a clone of it: same text and the
    /// very same top-level subtrees.
    pub fn shares_structure_with(&self, other: &TaskRoot) -> bool {
        self.id == other.id
            && self.text == other.text
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(a, b)| Arc::ptr_eq(a, b))
    }
}

/// Counts over a container's immediate children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CompletionStats {
    pub completed: usize,
    pub total: usize,
}

/// Anything that holds an ordered list of tasks: the root or a task.
pub trait TaskContainer: Sized {
    fn id(&self) -> &str;
    fn children(&self) -> &[Arc<TaskNode>];
    /// Copy of `self` with `children` swapped in; everything else is kept.
    fn with_children(&self, children: Vec<Arc<TaskNode>>) -> Self;

    fn completion_stats(&self) -> CompletionStats {
        let children = self.children();
        CompletionStats {
            completed: children.iter().filter(|c| c.is_completed()).count(),
            total: children.len(),
        }
    }
}

impl TaskContainer for TaskNode {
    fn id(&self) -> &str {
        TaskNode::id(self)
    }

    fn children(&self) -> &[Arc<TaskNode>] {
        TaskNode::children(self)
    }

    fn with_children(&self, children: Vec<Arc<TaskNode>>) -> Self {
        TaskNode {
            id: self.id.clone(),
            text: self.text.clone(),
            images: self.images.clone(),
            kind: NodeKind::Leaf { completed: false },
        }
        .replace_children(children)
    }
}

impl TaskContainer for TaskRoot {
    fn id(&self) -> &str {
        TaskRoot::id(self)
    }

    fn children(&self) -> &[Arc<TaskNode>] {
        TaskRoot::children(self)
    }

    fn with_children(&self, children: Vec<Arc<TaskNode>>) -> Self {
        TaskRoot {
            id: self.id.clone(),
            text: self.text.clone(),
            children,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde: `{ id, text, children, completed?, images? }`
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct NodeRepr<'a> {
    id: &'a str,
    text: &'a str,
    children: &'a [Arc<TaskNode>],
    #[serde(skip_serializing_if = "Option::is_none")]
    completed: Option<bool>,
    #[serde(skip_serializing_if = "<[TaskImage]>::is_empty")]
    images: &'a [TaskImage],
}

#[derive(Deserialize)]
struct RawNode {
    id: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    children: Vec<TaskNode>,
    #[serde(default)]
    completed: Option<bool>,
    #[serde(default)]
    images: Vec<TaskImage>,
}

impl Serialize for TaskNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        NodeRepr {
            id: &self.id,
            text: &self.text,
            children: self.children(),
            // Only completed leaves carry the flag on disk
            completed: self.completed_flag().filter(|c| *c),
            images: &self.images,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TaskNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawNode::deserialize(deserializer)?;
        let node = TaskNode {
            id: raw.id,
            text: raw.text,
            images: raw.images,
            kind: NodeKind::Leaf {
                completed: raw.completed.unwrap_or(false),
            },
        };
        if raw.children.is_empty() {
            Ok(node)
        } else {
            Ok(node.replace_children(raw.children.into_iter().map(Arc::new).collect()))
        }
    }
}
