//! Horizontal ranked bar chart.

use std::fmt::Write;

use badgetrack_core::stats::RankedRow;

use crate::escape_xml;

/// At most this many bars are drawn; extra rows are dropped from the tail
/// (input arrives ranked, so the tail is the least-visited end).
pub const MAX_ROWS: usize = 15;

/// Bar track length in SVG units; a row at the maximum value fills it.
const TRACK_WIDTH: f64 = 460.0;

// Leaves room after a full 460-unit bar (value text starts at x = 591)
// for a multi-digit count.
const CANVAS_WIDTH: u32 = 640;
const HEADER_HEIGHT: u32 = 40;
const ROW_HEIGHT: u32 = 20;
const ROW_GAP: u32 = 8;
const BOTTOM_PAD: u32 = 10;
/// Labels are right-aligned against this edge; bars start just after it.
const LABEL_EDGE: u32 = 120;
const BAR_X: u32 = 126;
const LABEL_MAX_CHARS: usize = 18;

#[derive(Debug, Clone)]
pub struct GraphColors {
    pub background: String,
    pub bar: String,
    pub text: String,
}

impl Default for GraphColors {
    fn default() -> Self {
        Self {
            background: "#fff".to_string(),
            bar: "#79c83d".to_string(),
            text: "#333".to_string(),
        }
    }
}

/// Render a ranked listing as a standalone bar-chart SVG.
///
/// Rows are truncated to [`MAX_ROWS`]; an empty listing renders a single
/// "no data" placeholder so the chart never comes back blank.
pub fn render(title: &str, rows: &[RankedRow], colors: &GraphColors) -> String {
    let placeholder = [RankedRow {
        label: "no data".to_string(),
        count: 0,
    }];
    let rows = if rows.is_empty() {
        &placeholder[..]
    } else {
        &rows[..rows.len().min(MAX_ROWS)]
    };

    let max_count = rows.iter().map(|r| r.count).max().unwrap_or(0).max(1);
    let height = HEADER_HEIGHT + rows.len() as u32 * (ROW_HEIGHT + ROW_GAP) + BOTTOM_PAD;

    let background = escape_xml(&colors.background);
    let bar = escape_xml(&colors.bar);
    let text = escape_xml(&colors.text);

    let mut svg = String::new();
    let _ = write!(
        svg,
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{CANVAS_WIDTH}" height="{height}">"##
    );
    let _ = write!(
        svg,
        r##"<rect width="{CANVAS_WIDTH}" height="{height}" fill="{background}"/>"##
    );
    let _ = write!(
        svg,
        r##"<g font-family="Verdana,Geneva,DejaVu Sans,sans-serif" fill="{text}">"##
    );
    let _ = write!(
        svg,
        r##"<text x="10" y="24" font-size="14" font-weight="bold">{}</text>"##,
        escape_xml(title)
    );

    for (i, row) in rows.iter().enumerate() {
        let y = HEADER_HEIGHT + i as u32 * (ROW_HEIGHT + ROW_GAP);
        let text_y = y + 14;
        let width = row.count as f64 / max_count as f64 * TRACK_WIDTH;
        let label: String = row.label.chars().take(LABEL_MAX_CHARS).collect();

        let _ = write!(
            svg,
            r##"<text x="{LABEL_EDGE}" y="{text_y}" font-size="11" text-anchor="end">{}</text>"##,
            escape_xml(&label)
        );
        let _ = write!(
            svg,
            r##"<rect class="bar" x="{BAR_X}" y="{y}" width="{width}" height="{ROW_HEIGHT}" fill="{bar}"/>"##
        );
        let value_x = BAR_X as f64 + width + 5.0;
        let _ = write!(
            svg,
            r##"<text x="{value_x}" y="{text_y}" font-size="11">{}</text>"##,
            row.count
        );
    }

    svg.push_str("</g></svg>");
    svg
}
