use std::collections::HashSet;
use std::sync::Arc;

use crate::model::task::{TaskContainer, TaskImage, TaskNode, TaskRoot};

/// Error type for structural moves
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("task not found: {0}")]
    NotFound(String),
    #[error("cannot drop a task onto itself")]
    SelfTarget,
    #[error("cannot move {dragged} into its own subtree ({target})")]
    Cycle { dragged: String, target: String },
    #[error("the root cannot be moved or used as a sibling")]
    RootMove,
}

/// Where a moved task lands relative to the target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropPosition {
    Before,
    After,
    Child,
}

/// Borrowed view of either the root or a task
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Root(&'a TaskRoot),
    Task(&'a Arc<TaskNode>),
}

impl<'a> NodeRef<'a> {
    pub fn id(self) -> &'a str {
        match self {
            NodeRef::Root(r) => r.id(),
            NodeRef::Task(t) => t.id(),
        }
    }

    pub fn text(self) -> &'a str {
        match self {
            NodeRef::Root(r) => r.text(),
            NodeRef::Task(t) => t.text(),
        }
    }

    pub fn children(self) -> &'a [Arc<TaskNode>] {
        match self {
            NodeRef::Root(r) => r.children(),
            NodeRef::Task(t) => t.children(),
        }
    }

    pub fn is_root(self) -> bool {
        matches!(self, NodeRef::Root(_))
    }

    pub fn as_task(self) -> Option<&'a Arc<TaskNode>> {
        match self {
            NodeRef::Root(_) => None,
            NodeRef::Task(t) => Some(t),
        }
    }
}

/// Result of a lookup: the node, its parent (None only for the root) and
/// its position among the parent's children.
#[derive(Debug, Clone, Copy)]
pub struct Found<'a> {
    pub node: NodeRef<'a>,
    pub parent: Option<NodeRef<'a>>,
    pub index: usize,
}

impl<'a> Found<'a> {
    /// Children of the parent, empty for the root
    pub fn siblings(&self) -> &'a [Arc<TaskNode>] {
        self.parent.map(|p| p.children()).unwrap_or(&[])
    }
}

/// Fields to overwrite in `update_task`. `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub text: Option<String>,
    /// Only applies to leaves
    pub completed: Option<bool>,
    pub images: Option<Vec<TaskImage>>,
}

impl TaskPatch {
    pub fn text(text: impl Into<String>) -> Self {
        TaskPatch {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn completed(completed: bool) -> Self {
        TaskPatch {
            completed: Some(completed),
            ..Default::default()
        }
    }

    fn apply(&self, node: &TaskNode) -> TaskNode {
        let mut out = node.clone();
        if let Some(text) = &self.text {
            out = out.with_text(text.clone());
        }
        if let Some(completed) = self.completed {
            out = out.with_completed(completed);
        }
        if let Some(images) = &self.images {
            out = out.with_images(images.clone());
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Depth-first pre-order search for `id`.
pub fn find_task<'a>(root: &'a TaskRoot, id: &str) -> Option<Found<'a>> {
    if root.id() == id {
        return Some(Found {
            node: NodeRef::Root(root),
            parent: None,
            index: 0,
        });
    }
    find_in(NodeRef::Root(root), id)
}

fn find_in<'a>(parent: NodeRef<'a>, id: &str) -> Option<Found<'a>> {
    for (index, child) in parent.children().iter().enumerate() {
        if child.id() == id {
            return Some(Found {
                node: NodeRef::Task(child),
                parent: Some(parent),
                index,
            });
        }
        if let Some(found) = find_in(NodeRef::Task(child), id) {
            return Some(found);
        }
    }
    None
}

/// True if `id` is `node` itself or anywhere below it.
pub fn is_descendant(node: &TaskNode, id: &str) -> bool {
    node.id() == id || node.children().iter().any(|c| is_descendant(c, id))
}

/// Every leaf task in display order
pub fn collect_leaves(root: &TaskRoot) -> Vec<&Arc<TaskNode>> {
    fn walk<'a>(children: &'a [Arc<TaskNode>], out: &mut Vec<&'a Arc<TaskNode>>) {
        for child in children {
            if child.has_children() {
                walk(child.children(), out);
            } else {
                out.push(child);
            }
        }
    }
    let mut out = Vec::new();
    walk(root.children(), &mut out);
    out
}

/// Every task in display order (root excluded)
pub fn collect_tasks(root: &TaskRoot) -> Vec<&Arc<TaskNode>> {
    fn walk<'a>(children: &'a [Arc<TaskNode>], out: &mut Vec<&'a Arc<TaskNode>>) {
        for child in children {
            out.push(child);
            walk(child.children(), out);
        }
    }
    let mut out = Vec::new();
    walk(root.children(), &mut out);
    out
}

/// Every task id in display order (root excluded)
pub fn collect_ids(root: &TaskRoot) -> Vec<&str> {
    collect_tasks(root).into_iter().map(|t| t.id()).collect()
}

/// Ids that appear more than once, including a task reusing the root id
pub fn duplicate_ids(root: &TaskRoot) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    seen.insert(root.id());
    let mut dups = Vec::new();
    for id in collect_ids(root) {
        if !seen.insert(id) && !dups.iter().any(|d: &String| d == id) {
            dups.push(id.to_string());
        }
    }
    dups
}

// ---------------------------------------------------------------------------
// Path rebuilding
// ---------------------------------------------------------------------------

/// Rebuild `children` so that the task `id` is replaced by `f(task)`.
/// Only the path down to the match is rebuilt; every other subtree is
/// shared. Returns None when `id` is not below this list.
fn map_task(
    children: &[Arc<TaskNode>],
    id: &str,
    f: &mut dyn FnMut(&TaskNode) -> TaskNode,
) -> Option<Vec<Arc<TaskNode>>> {
    for (i, child) in children.iter().enumerate() {
        let replaced = if child.id() == id {
            Some(f(child))
        } else {
            map_task(child.children(), id, f).map(|kids| child.with_children(kids))
        };
        if let Some(new_child) = replaced {
            let mut out = children.to_vec();
            out[i] = Arc::new(new_child);
            return Some(out);
        }
    }
    None
}

/// Apply `f` to the children list of container `parent_id` (root or task).
/// Unknown container: the tree comes back unchanged.
fn map_children(
    root: &TaskRoot,
    parent_id: &str,
    mut f: impl FnMut(&[Arc<TaskNode>]) -> Vec<Arc<TaskNode>>,
) -> TaskRoot {
    if root.id() == parent_id {
        return root.with_children(f(root.children()));
    }
    match map_task(root.children(), parent_id, &mut |node| {
        node.with_children(f(node.children()))
    }) {
        Some(children) => root.with_children(children),
        None => root.clone(),
    }
}

// ---------------------------------------------------------------------------
// Mutations (all return a new tree)
// ---------------------------------------------------------------------------

/// Shallow-merge `patch` into task `id`. On the root only `text` applies.
pub fn update_task(root: &TaskRoot, id: &str, patch: &TaskPatch) -> TaskRoot {
    if root.id() == id {
        return match &patch.text {
            Some(text) => root.clone().with_text(text.clone()),
            None => root.clone(),
        };
    }
    match map_task(root.children(), id, &mut |node| patch.apply(node)) {
        Some(children) => root.with_children(children),
        None => root.clone(),
    }
}

/// Append `node` to the children of `parent_id`. Unknown parent: no-op.
pub fn add_child(root: &TaskRoot, parent_id: &str, node: TaskNode) -> TaskRoot {
    let node = Arc::new(node);
    map_children(root, parent_id, |children| {
        let mut out = children.to_vec();
        out.push(node.clone());
        out
    })
}

/// Insert `node` right after position `after_index` of `parent`'s children.
pub fn add_sibling<C: TaskContainer>(parent: &C, after_index: usize, node: TaskNode) -> C {
    let mut children = parent.children().to_vec();
    let at = (after_index + 1).min(children.len());
    children.insert(at, Arc::new(node));
    parent.with_children(children)
}

/// `add_sibling` on container `parent_id`, threaded back into the tree.
pub fn insert_sibling(
    root: &TaskRoot,
    parent_id: &str,
    after_index: usize,
    node: TaskNode,
) -> TaskRoot {
    if root.id() == parent_id {
        return add_sibling(root, after_index, node);
    }
    match map_task(root.children(), parent_id, &mut |parent| {
        add_sibling(parent, after_index, node.clone())
    }) {
        Some(children) => root.with_children(children),
        None => root.clone(),
    }
}

/// Splice `node` into `parent_id`'s children at `index` (clamped).
/// The parent may be the root.
pub fn insert_at_index(root: &TaskRoot, parent_id: &str, index: usize, node: TaskNode) -> TaskRoot {
    let node = Arc::new(node);
    map_children(root, parent_id, |children| {
        let mut out = children.to_vec();
        out.insert(index.min(out.len()), node.clone());
        out
    })
}

/// Remove task `id` (with its subtree) wherever it is. Unknown id: no-op.
pub fn remove_task(root: &TaskRoot, id: &str) -> TaskRoot {
    match remove_in(root.children(), id) {
        Some(children) => root.with_children(children),
        None => root.clone(),
    }
}

fn remove_in(children: &[Arc<TaskNode>], id: &str) -> Option<Vec<Arc<TaskNode>>> {
    if let Some(pos) = children.iter().position(|c| c.id() == id) {
        let mut out = children.to_vec();
        out.remove(pos);
        return Some(out);
    }
    for (i, child) in children.iter().enumerate() {
        if let Some(kids) = remove_in(child.children(), id) {
            let mut out = children.to_vec();
            out[i] = Arc::new(child.with_children(kids));
            return Some(out);
        }
    }
    None
}

/// Flip the completion flag of a leaf. Parents and the root are left alone.
pub fn toggle_complete(root: &TaskRoot, id: &str) -> TaskRoot {
    let flag = find_task(root, id)
        .and_then(|found| found.node.as_task())
        .and_then(|task| task.completed_flag());
    match flag {
        Some(completed) => update_task(root, id, &TaskPatch::completed(!completed)),
        None => root.clone(),
    }
}

/// Append an image to task `id`
pub fn add_image(root: &TaskRoot, id: &str, image: TaskImage) -> TaskRoot {
    match map_task(root.children(), id, &mut |node| {
        let mut images = node.images().to_vec();
        images.push(image.clone());
        node.clone().with_images(images)
    }) {
        Some(children) => root.with_children(children),
        None => root.clone(),
    }
}

/// Move `dragged_id` relative to `target_id`.
///
/// The dragged subtree is removed first, then the target is looked up again
/// in the reduced tree, so indices always refer to the post-removal layout.
/// Rejected moves leave no partial state behind.
pub fn move_task(
    root: &TaskRoot,
    dragged_id: &str,
    target_id: &str,
    position: DropPosition,
) -> Result<TaskRoot, TreeError> {
    if dragged_id == target_id {
        return Err(TreeError::SelfTarget);
    }
    let dragged = find_task(root, dragged_id)
        .ok_or_else(|| TreeError::NotFound(dragged_id.to_string()))?
        .node
        .as_task()
        .ok_or(TreeError::RootMove)?
        .clone();

    if is_descendant(&dragged, target_id) {
        return Err(TreeError::Cycle {
            dragged: dragged_id.to_string(),
            target: target_id.to_string(),
        });
    }

    let reduced = remove_task(root, dragged_id);
    let target = find_task(&reduced, target_id)
        .ok_or_else(|| TreeError::NotFound(target_id.to_string()))?;
    let node = TaskNode::clone(&dragged);

    let moved = match position {
        DropPosition::Child => add_child(&reduced, target_id, node),
        DropPosition::Before | DropPosition::After => {
            let parent = target.parent.ok_or(TreeError::RootMove)?;
            let index = match position {
                DropPosition::Before => target.index,
                _ => target.index + 1,
            };
            insert_at_index(&reduced, parent.id(), index, node)
        }
    };
    Ok(moved)
}
