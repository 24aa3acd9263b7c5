pub mod badge;
pub mod graph;
pub mod health;
pub mod stats;
pub mod visit;

use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use badgetrack_render::badge::BadgeColors;

/// Wrap an SVG string in a response with the right content type and caching
/// disabled — badge hosts aggressively cache images otherwise, freezing the
/// count.
pub fn svg_response(svg: String) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/svg+xml; charset=utf-8"),
            (
                header::CACHE_CONTROL,
                "no-cache, no-store, must-revalidate, max-age=0",
            ),
        ],
        svg,
    )
        .into_response()
}

/// Badge palette from optional query overrides, defaulting per
/// [`BadgeColors::default`]. Values are embedded after XML escaping in the
/// renderer, so raw query strings are safe here.
pub fn badge_colors(color: Option<String>, label_color: Option<String>) -> BadgeColors {
    let mut colors = BadgeColors::default();
    if let Some(color) = color.filter(|c| !c.is_empty()) {
        colors.value_bg = normalize_color(color);
    }
    if let Some(label_color) = label_color.filter(|c| !c.is_empty()) {
        colors.label_bg = normalize_color(label_color);
    }
    colors
}

/// Accept bare hex values (`79c83d`) as well as full CSS colors.
fn normalize_color(raw: String) -> String {
    let is_bare_hex = matches!(raw.len(), 3 | 6) && raw.chars().all(|c| c.is_ascii_hexdigit());
    if is_bare_hex {
        format!("#{raw}")
    } else {
        raw
    }
}

/// First `X-Forwarded-For` entry, or `"unknown"` when absent.
pub fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn header_string(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_hex_colors_gain_a_hash() {
        let colors = badge_colors(Some("79c83d".to_string()), Some("555".to_string()));
        assert_eq!(colors.value_bg, "#79c83d");
        assert_eq!(colors.label_bg, "#555");
    }

    #[test]
    fn css_names_pass_through() {
        let colors = badge_colors(Some("tomato".to_string()), None);
        assert_eq!(colors.value_bg, "tomato");
        assert_eq!(colors.label_bg, "#555");
    }

    #[test]
    fn client_ip_takes_first_forwarded_entry() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
        assert_eq!(client_ip(&headers), "203.0.113.7");
        assert_eq!(client_ip(&HeaderMap::new()), "unknown");
    }
}
