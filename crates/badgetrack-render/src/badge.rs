//! Two-segment count badge.
//!
//! Widths come from fixed per-character constants, not measured glyph
//! metrics — an approximation that keeps rendering pure and deterministic.
//! The embossed look is a dark low-opacity copy of each string one pixel
//! below the real text, which avoids SVG blur filters entirely.

use std::fmt::Write;

use crate::escape_xml;

const HEIGHT: u32 = 20;
const LABEL_CHAR_WIDTH: f64 = 6.5;
const LABEL_PADDING: f64 = 20.0;
const LABEL_MIN_WIDTH: f64 = 50.0;
const VALUE_CHAR_WIDTH: f64 = 7.5;
const VALUE_PADDING: f64 = 16.0;
const VALUE_MIN_WIDTH: f64 = 38.0;

/// Badge palette. Hex strings are embedded verbatim in fill attributes.
#[derive(Debug, Clone)]
pub struct BadgeColors {
    pub label_bg: String,
    pub value_bg: String,
    pub text: String,
}

impl Default for BadgeColors {
    fn default() -> Self {
        Self {
            label_bg: "#555".to_string(),
            value_bg: "#79c83d".to_string(),
            text: "#fff".to_string(),
        }
    }
}

/// Render a label/value badge as a standalone SVG document.
/// Same inputs produce a byte-identical string.
pub fn render(label: &str, value: &str, colors: &BadgeColors) -> String {
    let label_w = (LABEL_CHAR_WIDTH * label.chars().count() as f64 + LABEL_PADDING)
        .max(LABEL_MIN_WIDTH);
    let value_w = (VALUE_CHAR_WIDTH * value.chars().count() as f64 + VALUE_PADDING)
        .max(VALUE_MIN_WIDTH);
    let total_w = label_w + value_w;
    let label_x = label_w / 2.0;
    let value_x = label_w + value_w / 2.0;

    let label = escape_xml(label);
    let value = escape_xml(value);
    let label_bg = escape_xml(&colors.label_bg);
    let value_bg = escape_xml(&colors.value_bg);
    let text = escape_xml(&colors.text);

    let mut svg = String::new();
    let _ = write!(
        svg,
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{total_w}" height="{HEIGHT}">"##
    );
    let _ = write!(
        svg,
        r##"<linearGradient id="smooth" x2="0" y2="100%"><stop offset="0" stop-color="#bbb" stop-opacity=".1"/><stop offset="1" stop-opacity=".1"/></linearGradient>"##
    );
    let _ = write!(
        svg,
        r##"<clipPath id="round"><rect width="{total_w}" height="{HEIGHT}" rx="3" fill="#fff"/></clipPath>"##
    );
    let _ = write!(
        svg,
        r##"<g clip-path="url(#round)"><rect width="{label_w}" height="{HEIGHT}" fill="{label_bg}"/><rect x="{label_w}" width="{value_w}" height="{HEIGHT}" fill="{value_bg}"/><rect width="{total_w}" height="{HEIGHT}" fill="url(#smooth)"/></g>"##
    );
    let _ = write!(
        svg,
        r##"<g fill="{text}" text-anchor="middle" font-family="Verdana,Geneva,DejaVu Sans,sans-serif" font-size="11">"##
    );
    // Shadow copy one pixel down, then the real string on top.
    let _ = write!(
        svg,
        r##"<text x="{label_x}" y="15" fill="#010101" fill-opacity=".3">{label}</text><text x="{label_x}" y="14">{label}</text>"##
    );
    let _ = write!(
        svg,
        r##"<text x="{value_x}" y="15" fill="#010101" fill-opacity=".3">{value}</text><text x="{value_x}" y="14">{value}</text>"##
    );
    svg.push_str("</g></svg>");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendering_is_deterministic() {
        let colors = BadgeColors::default();
        let a = render("visitors", "1234", &colors);
        let b = render("visitors", "1234", &colors);
        assert_eq!(a, b);
    }

    #[test]
    fn widths_follow_the_character_formula() {
        let svg = render("visitors", "42", &BadgeColors::default());
        // label: 6.5 * 8 + 20 = 72; value: max(7.5 * 2 + 16, 38) = 38.
        assert!(svg.contains(r#"width="110" height="20""#), "total width: {svg}");
        assert!(svg.contains(r#"<rect width="72" height="20""#));
        assert!(svg.contains(r#"<rect x="72" width="38""#));
    }

    #[test]
    fn short_strings_hit_minimum_widths() {
        let svg = render("a", "1", &BadgeColors::default());
        // label floors at 50, value at 38.
        assert!(svg.contains(r#"width="88" height="20""#), "total width: {svg}");
    }

    #[test]
    fn metacharacters_are_escaped() {
        let svg = render("<script>", "\"&'", &BadgeColors::default());
        assert!(svg.contains("&lt;script&gt;"));
        assert!(svg.contains("&quot;&amp;&apos;"));
        assert!(!svg.contains("<script>"));
    }

    #[test]
    fn no_external_references() {
        let svg = render("visitors", "1", &BadgeColors::default());
        assert!(!svg.contains("href=\"http"));
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn shadow_text_sits_one_pixel_below() {
        let svg = render("visitors", "1", &BadgeColors::default());
        let shadow = svg.find(r##"y="15" fill="#010101""##).unwrap();
        let real = svg.find(r#"y="14">visitors"#).unwrap();
        assert!(shadow < real, "shadow copy must precede the real text");
    }
}
