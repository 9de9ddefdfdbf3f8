mod helpers;
pub mod restore_prompt;
pub mod status_row;
pub mod tree_view;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::widgets::Block;

use super::app::{App, Mode};

/// Main render function, dispatches to sub-renderers
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    let previews = app.previews();
    let preview_height = if previews.is_empty() { 0 } else { 1 };

    // Layout: header | content | links (when any) | status row
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(preview_height),
            Constraint::Length(1),
        ])
        .split(area);

    tree_view::render_header(frame, app, chunks[0]);
    tree_view::render_content(frame, app, chunks[1]);
    if !previews.is_empty() {
        status_row::render_preview_row(frame, app, &previews, chunks[2]);
    }
    status_row::render_status_row(frame, app, chunks[3]);

    // Restore popup (rendered on top of everything)
    if app.mode == Mode::Restore {
        restore_prompt::render_restore_prompt(frame, app, area);
    }
}
