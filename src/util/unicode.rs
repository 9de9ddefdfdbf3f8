use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Display width in terminal cells
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate to `max_cells` terminal cells, ending with `…` when cut.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    if max_cells == 0 {
        return String::new();
    }
    let budget = max_cells - 1;
    let mut width = 0;
    let mut out = String::new();
    for g in s.graphemes(true) {
        let gw = display_width(g);
        if width + gw > budget {
            break;
        }
        width += gw;
        out.push_str(g);
    }
    out.push('\u{2026}');
    out
}

/// Next grapheme boundary after `offset`, None at the end
pub fn next_grapheme_boundary(s: &str, offset: usize) -> Option<usize> {
    let rest = s.get(offset..)?;
    let g = rest.graphemes(true).next()?;
    Some(offset + g.len())
}

/// Previous grapheme boundary before `offset`, None at the start
pub fn prev_grapheme_boundary(s: &str, offset: usize) -> Option<usize> {
    let head = s.get(..offset)?;
    let (i, _) = head.grapheme_indices(true).next_back()?;
    Some(i)
}

/// Byte range `(start, end)` of the line holding `offset`, newline excluded
pub fn line_bounds(s: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(s.len());
    let start = s[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let end = s[offset..].find('\n').map(|i| offset + i).unwrap_or(s.len());
    (start, end)
}

/// `(row, column in cells)` of `offset`
pub fn cursor_position(s: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(s.len());
    let row = s[..offset].matches('\n').count();
    let (start, _) = line_bounds(s, offset);
    (row, display_width(&s[start..offset]))
}

/// Offset in `line` closest to column `col`, snapping to a grapheme start
fn offset_at_col(line: &str, col: usize) -> usize {
    let mut width = 0;
    for (i, g) in line.grapheme_indices(true) {
        let gw = display_width(g);
        if width + gw > col {
            return i;
        }
        width += gw;
    }
    line.len()
}

/// Cursor one line up (`up == true`) or down, keeping the column.
/// None when there is no such line.
pub fn move_vertically(s: &str, offset: usize, up: bool) -> Option<usize> {
    let (start, end) = line_bounds(s, offset);
    let (_, col) = cursor_position(s, offset);
    let (line_start, line_end) = if up {
        if start == 0 {
            return None;
        }
        line_bounds(s, start - 1)
    } else {
        if end == s.len() {
            return None;
        }
        line_bounds(s, end + 1)
    };
    Some(line_start + offset_at_col(&s[line_start..line_end], col))
}
