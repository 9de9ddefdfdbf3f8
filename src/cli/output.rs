use serde::Serialize;

use crate::model::task::{CompletionStats, TaskContainer, TaskNode, TaskRoot};
use crate::preview::url::{PreviewRequest, UrlKind};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub id: String,
    pub text: String,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<CompletionStats>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct TreeJson {
    pub id: String,
    pub text: String,
    pub stats: CompletionStats,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct LeafJson {
    pub id: String,
    pub text: String,
    pub completed: bool,
}

#[derive(Serialize)]
pub struct UrlJson {
    pub task_id: String,
    pub url: String,
    pub kind: UrlKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<PreviewRequest>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(task: &TaskNode) -> TaskJson {
    TaskJson {
        id: task.id().to_string(),
        text: task.text().to_string(),
        completed: task.is_completed(),
        stats: task.has_children().then(|| task.completion_stats()),
        images: task.images().iter().map(|i| i.url.clone()).collect(),
        children: task.children().iter().map(|c| task_to_json(c)).collect(),
    }
}

pub fn tree_to_json(root: &TaskRoot) -> TreeJson {
    TreeJson {
        id: root.id().to_string(),
        text: root.text().to_string(),
        stats: root.completion_stats(),
        tasks: root.children().iter().map(|c| task_to_json(c)).collect(),
    }
}

pub fn leaf_to_json(task: &TaskNode) -> LeafJson {
    LeafJson {
        id: task.id().to_string(),
        text: task.text().to_string(),
        completed: task.is_completed(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

fn check_char(task: &TaskNode) -> char {
    if task.is_completed() { 'x' } else { ' ' }
}

/// Task text on one line
fn one_line(text: &str) -> String {
    if text.is_empty() {
        "(empty)".to_string()
    } else {
        text.replace('\n', " / ")
    }
}

fn stats_suffix(stats: CompletionStats) -> String {
    format!(" ({}/{})", stats.completed, stats.total)
}

/// `[x] id text`, with child counts for parents and an image count
pub fn format_task_line(task: &TaskNode) -> String {
    let stats = if task.has_children() {
        stats_suffix(task.completion_stats())
    } else {
        String::new()
    };
    let images = match task.images().len() {
        0 => String::new(),
        1 => " [1 image]".to_string(),
        n => format!(" [{} images]", n),
    };
    format!(
        "[{}] {} {}{}{}",
        check_char(task),
        task.id(),
        one_line(task.text()),
        stats,
        images
    )
}

/// A task with its subtasks, indented
pub fn format_task_tree(task: &TaskNode, indent: usize) -> Vec<String> {
    let mut lines = vec![format!("{}{}", "  ".repeat(indent), format_task_line(task))];
    for child in task.children() {
        lines.extend(format_task_tree(child, indent + 1));
    }
    lines
}

/// The whole tree, headed by the root's text and top-level counts
pub fn format_outline(root: &TaskRoot) -> Vec<String> {
    let mut lines = vec![format!(
        "{}{}",
        root.text(),
        stats_suffix(root.completion_stats())
    )];
    for task in root.children() {
        lines.extend(format_task_tree(task, 0));
    }
    lines
}

pub fn format_url_line(task_id: &str, kind: UrlKind, url: &str) -> String {
    format!("{} {:<8}{}", task_id, kind.to_string(), url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    fn sample() -> TaskRoot {
        TaskRoot::new(vec![
            TaskNode::new("a", "Groceries")
                .with_child(TaskNode::new("m", "Milk").with_completed(true))
                .with_child(TaskNode::new("e", "Eggs\nfree range")),
            TaskNode::new("b", "Call mom"),
            TaskNode::empty("c").with_completed(true),
        ])
    }

    #[test]
    fn test_outline_text() {
        let out = format_outline(&sample()).join("\n");
        assert_snapshot!(out, @r"
        Root (1/3)
        [ ] a Groceries (1/2)
          [x] m Milk
          [ ] e Eggs / free range
        [ ] b Call mom
        [x] c (empty)
        ");
    }

    #[test]
    fn test_json_omits_leaf_stats_and_empty_lists() {
        let json = serde_json::to_value(tree_to_json(&sample())).unwrap();
        assert_eq!(json["stats"]["total"], 3);
        assert_eq!(json["tasks"][0]["stats"]["completed"], 1);
        assert!(json["tasks"][1].get("stats").is_none());
        assert!(json["tasks"][1].get("children").is_none());
        assert_eq!(json["tasks"][2]["completed"], true);
    }

    #[test]
    fn test_url_line_is_aligned() {
        assert_eq!(
            format_url_line("a", UrlKind::Slack, "https://x.slack.com"),
            "a slack   https://x.slack.com"
        );
    }
}
