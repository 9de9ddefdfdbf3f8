use ratatui::layout::Rect;
use ratatui::text::Span;

use crate::model::CompletionStats;
use crate::preview::url::PreviewRequest;
use crate::util::unicode;

/// Checkbox for a task, trailing space included
pub(super) fn checkbox(completed: bool) -> &'static str {
    if completed { "[x] " } else { "[ ] " }
}

/// ` (done/total)` after a parent's text
pub(super) fn stats_label(stats: CompletionStats) -> String {
    format!(" ({}/{})", stats.completed, stats.total)
}

pub(super) fn images_label(count: usize) -> String {
    match count {
        0 => String::new(),
        1 => " [1 image]".to_string(),
        n => format!(" [{} images]", n),
    }
}

/// Short description of what a link would preview
pub(super) fn preview_label(request: &PreviewRequest) -> String {
    match request {
        PreviewRequest::Slack(msg) => format!(
            "slack {}/{} {}",
            msg.workspace, msg.channel_id, msg.timestamp
        ),
        PreviewRequest::GitHub(pr) => format!("github {}/{}#{}", pr.owner, pr.repo, pr.number),
        PreviewRequest::Jira { url } => format!("jira {}", url),
    }
}

/// Compute total display width of a slice of spans
pub(super) fn spans_width(spans: &[Span]) -> usize {
    spans
        .iter()
        .map(|s| unicode::display_width(&s.content))
        .sum()
}

pub(super) fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}
