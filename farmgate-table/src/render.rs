//! Text rendering of a table frame.
//!
//! Layout:
//!
//! ```text
//! Filters: status=pending
//! [-] | Customer ▲ | Status  |  Amount
//! ----+------------+---------+--------
//! [x] | Blue Fin   | pending |   31.95
//! [ ] | Salmon Co  | pending |   12.00
//! Page 1 of 1 | 2 rows | 1 selected
//! ```

use farmgate_lib::api::query::Direction;
use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

use crate::column::Alignment;
use crate::selection::CheckState;

/// Auto-sized columns never grow past this.
const MAX_AUTO_WIDTH: usize = 40;

const SEPARATOR: &str = " | ";

/// A visible column as the renderer sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameColumn {
    pub key: String,
    pub title: String,
    pub align: Alignment,
    pub width: Option<usize>,
    pub sortable: bool,
    pub sort: Option<Direction>,
}

/// A row on the current page, cells already rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRow {
    pub id: String,
    pub selected: bool,
    pub cells: Vec<String>,
}

/// Everything needed to draw one table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableFrame {
    pub columns: Vec<FrameColumn>,
    pub rows: Vec<FrameRow>,
    pub show_selection: bool,
    pub check_state: CheckState,
    /// Active filters as `(key, value)`.
    pub active_filters: Vec<(String, String)>,
    pub show_pagination: bool,
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
    pub page_size: usize,
    pub selected: usize,
    pub loading: bool,
    pub error: Option<String>,
    /// Labels of the per-row actions.
    pub row_actions: Vec<String>,
}

/// Renders `frame` as plain text, one line per row.
pub fn render(frame: &TableFrame) -> String {
    let mut out = String::new();

    if !frame.active_filters.is_empty() {
        let filters: Vec<String> = frame
            .active_filters
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        out.push_str(&format!("Filters: {}\n", filters.join(", ")));
    }
    if let Some(error) = &frame.error {
        out.push_str(&format!("! {}\n", error));
    }

    let widths = column_widths(frame);

    // Header
    let mut header: Vec<String> = Vec::with_capacity(widths.len() + 1);
    if frame.show_selection {
        header.push(checkbox(frame.check_state).to_string());
    }
    for (column, width) in frame.columns.iter().zip(&widths) {
        header.push(fit(&header_title(column), *width, column.align));
    }
    push_line(&mut out, &header);

    let rule: Vec<String> = header.iter().map(|h| "-".repeat(h.width())).collect();
    out.push_str(&rule.join("-+-"));
    out.push('\n');

    // Body
    if frame.rows.is_empty() {
        out.push_str(if frame.loading { "Loading...\n" } else { "No records found\n" });
    }
    for row in &frame.rows {
        let mut line: Vec<String> = Vec::with_capacity(widths.len() + 1);
        if frame.show_selection {
            line.push(if row.selected { "[x]" } else { "[ ]" }.to_string());
        }
        for ((cell, column), width) in row.cells.iter().zip(&frame.columns).zip(&widths) {
            line.push(fit(cell, *width, column.align));
        }
        push_line(&mut out, &line);
    }

    // Footer
    let mut footer = Vec::new();
    if frame.show_pagination {
        footer.push(format!("Page {} of {}", frame.page, frame.total_pages));
    }
    footer.push(format!(
        "{} {}",
        frame.total,
        if frame.total == 1 { "row" } else { "rows" }
    ));
    if frame.selected > 0 {
        footer.push(format!("{} selected", frame.selected));
    }
    if !frame.row_actions.is_empty() {
        footer.push(format!("actions: {}", frame.row_actions.join(", ")));
    }
    if frame.loading && !frame.rows.is_empty() {
        footer.push("loading...".to_string());
    }
    out.push_str(&footer.join(SEPARATOR));
    out.push('\n');
    out
}

fn push_line(out: &mut String, cells: &[String]) {
    out.push_str(cells.join(SEPARATOR).trim_end());
    out.push('\n');
}

fn checkbox(state: CheckState) -> &'static str {
    match state {
        CheckState::Unchecked => "[ ]",
        CheckState::Indeterminate => "[-]",
        CheckState::Checked => "[x]",
    }
}

fn header_title(column: &FrameColumn) -> String {
    match column.sort {
        Some(Direction::Asc) => format!("{} ▲", column.title),
        Some(Direction::Desc) => format!("{} ▼", column.title),
        None => column.title.clone(),
    }
}

fn column_widths(frame: &TableFrame) -> Vec<usize> {
    frame
        .columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            column.width.unwrap_or_else(|| {
                let cells = frame
                    .rows
                    .iter()
                    .filter_map(|r| r.cells.get(i))
                    .map(|c| c.width());
                cells
                    .chain(std::iter::once(header_title(column).width()))
                    .max()
                    .unwrap_or(1)
                    .min(MAX_AUTO_WIDTH)
            })
        })
        .collect()
}

/// Pads or truncates `text` to exactly `width` display columns.
fn fit(text: &str, width: usize, align: Alignment) -> String {
    let text = truncate_to_width(text, width);
    let pad = width.saturating_sub(text.width());
    match align {
        Alignment::Left => format!("{}{}", text, " ".repeat(pad)),
        Alignment::Right => format!("{}{}", " ".repeat(pad), text),
        Alignment::Center => {
            let left = pad / 2;
            format!("{}{}{}", " ".repeat(left), text, " ".repeat(pad - left))
        }
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let target = max_width - 1;
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if width + w > target {
            break;
        }
        result.push(ch);
        width += w;
    }
    result.push('…');
    result
}

/// Writes a header and rows as CSV (RFC 4180 quoting, `\n` line ends).
pub fn csv(header: &[String], rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    for line in std::iter::once(header).chain(rows.iter().map(Vec::as_slice)) {
        let fields: Vec<String> = line.iter().map(|f| csv_field(f)).collect();
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
