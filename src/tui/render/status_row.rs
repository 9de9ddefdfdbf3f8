use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::io::autosave::SaveStatus;
use crate::preview::url::PreviewRequest;
use crate::tui::app::{App, Mode};

use super::helpers::{preview_label, spans_width};

fn key_hints(app: &App) -> &'static str {
    match app.mode {
        Mode::Restore => "y restore  n start fresh",
        Mode::Attach => "enter attach  esc cancel",
        Mode::Edit if app.session.focused_id().is_some() => {
            "enter new  tab child  ^x done  ^d delete  ^o image  esc leave"
        }
        Mode::Edit => "\u{2191}\u{2193} select  n new  v view  q quit",
    }
}

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let mut spans = if app.mode == Mode::Attach {
        vec![
            Span::styled(
                format!(" attach image: {}", app.attach_input),
                Style::default().fg(app.theme.text_bright).bg(bg),
            ),
            Span::styled("\u{258C}", Style::default().fg(app.theme.highlight).bg(bg)), // ▌ cursor
        ]
    } else if let Some(message) = &app.status_message {
        vec![Span::styled(
            format!(" {}", message),
            Style::default().fg(app.theme.yellow).bg(bg),
        )]
    } else if app.show_key_hints {
        vec![Span::styled(
            format!(" {}", key_hints(app)),
            Style::default().fg(app.theme.dim).bg(bg),
        )]
    } else {
        Vec::new()
    };

    let status = app.autosave.status();
    let status_color = match status {
        SaveStatus::Saved => app.theme.dim,
        SaveStatus::Pending => app.theme.yellow,
        SaveStatus::Error => app.theme.red,
    };
    let right = format!(
        "{}  {}% ",
        status,
        (app.document.zoom * 100.0).round() as i64
    );
    let content_width = spans_width(&spans);
    let right_width = right.chars().count();
    if content_width + right_width < width {
        let padding = width - content_width - right_width;
        spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
        spans.push(Span::styled(right, Style::default().fg(status_color).bg(bg)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

/// One line naming what the focused task's links would preview
pub fn render_preview_row(frame: &mut Frame, app: &App, previews: &[PreviewRequest], area: Rect) {
    let bg = app.theme.background;
    let mut spans = vec![Span::styled(" links: ", Style::default().fg(app.theme.dim).bg(bg))];
    for (i, request) in previews.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("  ", Style::default().bg(bg)));
        }
        spans.push(Span::styled(
            preview_label(request),
            Style::default().fg(app.theme.cyan).bg(bg),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
