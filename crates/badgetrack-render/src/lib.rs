//! Deterministic SVG rendering: the two-segment count badge and the
//! horizontal ranked bar chart. Pure string builders, no I/O, no external
//! references in the output.

pub mod badge;
pub mod graph;

/// Escape the five XML metacharacters before embedding dynamic text.
/// `&` must go first so already-escaped entities are not double-mangled.
pub fn escape_xml(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_all_five_metacharacters() {
        assert_eq!(
            escape_xml(r#"<a href="x">&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&apos;&lt;/a&gt;"
        );
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(escape_xml("visitors"), "visitors");
    }
}
