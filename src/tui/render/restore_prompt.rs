use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::ops::tree_ops;
use crate::tui::app::App;

use super::helpers::centered_rect_fixed;

/// Render the startup popup offering the saved tree
pub fn render_restore_prompt(frame: &mut Frame, app: &App, area: Rect) {
    let Some(doc) = &app.restore_candidate else {
        return;
    };

    let bg = app.theme.background;
    let header_style = Style::default()
        .fg(app.theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let text_style = Style::default().fg(app.theme.text).bg(bg);
    let key_style = Style::default().fg(app.theme.text_bright).bg(bg);

    let count = tree_ops::collect_ids(&doc.root).len();
    let lines = vec![
        Line::from(Span::styled(" Restore saved tree?", header_style)),
        Line::from(Span::styled("", text_style)),
        Line::from(Span::styled(
            format!("  Saved {}", doc.saved_at.format("%Y-%m-%d %H:%M UTC")),
            text_style,
        )),
        Line::from(Span::styled(
            format!("  {} task{}", count, if count == 1 { "" } else { "s" }),
            text_style,
        )),
        Line::from(Span::styled("", text_style)),
        Line::from(vec![
            Span::styled("  ", text_style),
            Span::styled("y", key_style),
            Span::styled(" restore   ", text_style),
            Span::styled("n", key_style),
            Span::styled(" start fresh", text_style),
        ]),
    ];

    let popup_w: u16 = 44.min(area.width.saturating_sub(2));
    let popup_h = ((lines.len() as u16) + 2).min(area.height.saturating_sub(2));
    let overlay_area = centered_rect_fixed(popup_w, popup_h, area);
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.highlight).bg(bg))
        .style(Style::default().bg(bg));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().bg(bg));

    frame.render_widget(paragraph, overlay_area);
}
