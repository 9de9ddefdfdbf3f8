use std::collections::HashSet;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::{TaskContainer, TaskNode};
use crate::ops::tree_ops;
use crate::tui::app::{App, Mode, View};
use crate::util::unicode;

use super::helpers::{checkbox, images_label, spans_width, stats_label};

/// Cells taken by `[ ] ` in front of the first text line
const CHECKBOX_WIDTH: usize = 4;

/// One screen line of the content area: a single line of a task's text
struct RowLine<'a> {
    task: &'a TaskNode,
    depth: usize,
    line_no: usize,
    text: &'a str,
}

fn push_task<'a>(task: &'a TaskNode, depth: usize, rows: &mut Vec<RowLine<'a>>) {
    for (line_no, text) in task.text().split('\n').enumerate() {
        rows.push(RowLine {
            task,
            depth,
            line_no,
            text,
        });
    }
}

fn push_tree<'a>(task: &'a TaskNode, depth: usize, rows: &mut Vec<RowLine<'a>>) {
    push_task(task, depth, rows);
    for child in task.children() {
        push_tree(child, depth + 1, rows);
    }
}

fn build_rows(app: &App) -> Vec<RowLine<'_>> {
    let root = app.session.root();
    let mut rows = Vec::new();
    match app.view {
        View::Tree => {
            for task in root.children() {
                push_tree(task, 0, &mut rows);
            }
        }
        View::List => {
            for leaf in tree_ops::collect_leaves(root) {
                push_task(leaf, 0, &mut rows);
            }
        }
    }
    rows
}

/// Header: root text and its counts, view name on the right
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let root = app.session.root();

    let mut spans = vec![
        Span::styled(
            format!(" {}", root.text()),
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            stats_label(root.completion_stats()),
            Style::default().fg(app.theme.dim).bg(bg),
        ),
    ];
    let view_name = match app.view {
        View::Tree => "tree ",
        View::List => "list ",
    };
    let used = spans_width(&spans) + view_name.len();
    let width = area.width as usize;
    if used < width {
        spans.push(Span::styled(" ".repeat(width - used), Style::default().bg(bg)));
        spans.push(Span::styled(
            view_name,
            Style::default().fg(app.theme.highlight).bg(bg),
        ));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(bg)),
        area,
    );
}

/// Render the task rows, keep the focused line in view and record which
/// tasks made it on screen.
pub fn render_content(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    let height = area.height as usize;
    let width = area.width as usize;

    if app.session.root().children().is_empty() || height == 0 {
        app.rendered_ids.clear();
        app.scroll_offset = 0;
        let empty = Paragraph::new(" No tasks (n to add one)")
            .style(Style::default().fg(app.theme.dim).bg(bg));
        frame.render_widget(empty, area);
        return;
    }

    let (lines, rendered, scroll, cursor_at) = {
        let rows = build_rows(app);
        let focused = app.session.focused_id();
        let indent = app.indent_width();
        let pan = app.pan_margin();

        // Row index and column of the text cursor
        let cursor_line = focused.and_then(|id| {
            let first = rows.iter().position(|r| r.task.id() == id)?;
            let (row, col) = unicode::cursor_position(rows[first].task.text(), app.cursor());
            Some((first + row, col))
        });

        let mut scroll = app.scroll_offset.min(rows.len() - 1);
        if let Some((line, _)) = cursor_line {
            if line < scroll {
                scroll = line;
            } else if line >= scroll + height {
                scroll = line + 1 - height;
            }
        }
        let end = rows.len().min(scroll + height);

        let mut lines = Vec::with_capacity(end - scroll);
        let mut rendered = HashSet::new();
        for row in &rows[scroll..end] {
            let is_focused = focused == Some(row.task.id());
            let margin = row_margin(pan, row.depth, indent).min(width);
            lines.push(render_row(app, row, is_focused, margin, width));
            rendered.insert(row.task.id().to_string());
        }

        let cursor_at = cursor_line.and_then(|(line, col)| {
            let row = rows.get(line)?;
            let visible = line >= scroll && line < end;
            visible.then(|| {
                let x = row_margin(pan, row.depth, indent)
                    .saturating_add(CHECKBOX_WIDTH)
                    .saturating_add(col);
                (x, line - scroll)
            })
        });

        (lines, rendered, scroll, cursor_at)
    };

    app.scroll_offset = scroll;
    app.rendered_ids = rendered;

    frame.render_widget(
        Paragraph::new(lines).style(Style::default().bg(bg)),
        area,
    );

    if app.mode == Mode::Edit
        && let Some((x, y)) = cursor_at
        && x < width
    {
        frame.set_cursor_position((area.x + x as u16, area.y + y as u16));
    }
}

/// Cells left of a row's checkbox
fn row_margin(pan: usize, depth: usize, indent: usize) -> usize {
    pan.saturating_add(depth.saturating_mul(indent))
}

fn render_row(
    app: &App,
    row: &RowLine<'_>,
    is_focused: bool,
    margin: usize,
    width: usize,
) -> Line<'static> {
    let theme = &app.theme;
    let bg = if is_focused {
        theme.selection_bg
    } else {
        theme.background
    };
    let completed = row.task.is_completed();
    let text_style = if completed {
        Style::default()
            .fg(theme.dim)
            .bg(bg)
            .add_modifier(Modifier::CROSSED_OUT)
    } else if is_focused {
        Style::default().fg(theme.text_bright).bg(bg)
    } else {
        Style::default().fg(theme.text).bg(bg)
    };
    let dim_style = Style::default().fg(theme.dim).bg(bg);

    let mut spans = vec![Span::styled(
        " ".repeat(margin),
        Style::default().bg(theme.background),
    )];

    if row.line_no == 0 {
        spans.push(Span::styled(
            checkbox(completed),
            Style::default().fg(theme.check_color(completed)).bg(bg),
        ));
    } else {
        spans.push(Span::styled(" ".repeat(CHECKBOX_WIDTH), Style::default().bg(bg)));
    }
    spans.push(Span::styled(row.text.to_string(), text_style));

    if row.line_no == 0 {
        if row.task.has_children() {
            spans.push(Span::styled(
                stats_label(row.task.completion_stats()),
                dim_style,
            ));
        }
        let images = images_label(row.task.images().len());
        if !images.is_empty() {
            spans.push(Span::styled(images, Style::default().fg(theme.cyan).bg(bg)));
        }
    }

    if is_focused {
        let used = spans_width(&spans);
        if used < width {
            spans.push(Span::styled(" ".repeat(width - used), Style::default().bg(bg)));
        }
    }

    Line::from(spans)
}
