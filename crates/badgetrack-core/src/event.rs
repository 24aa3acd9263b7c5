use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request headers captured into the visit metadata record. Anything outside
/// this list is dropped before the event reaches the recorder.
pub const ALLOWED_HEADERS: &[&str] = &[
    "accept-language",
    "host",
    "referer",
    "user-agent",
    "x-forwarded-for",
    "cf-ipcountry",
];

/// One normalized inbound visit, assembled by the HTTP shell from the request.
///
/// `user` and `repo` are free-form client-supplied identifiers; nothing here
/// validates them against a registry.
#[derive(Debug, Clone)]
pub struct VisitEvent {
    pub user: String,
    pub repo: Option<String>,
    pub ip: String,
    pub country: String,
    pub referer: String,
    pub user_agent: String,
    /// Allow-listed request headers, lowercase names. BTreeMap so the stored
    /// JSON serializes in a stable order.
    pub headers: BTreeMap<String, String>,
}

impl VisitEvent {
    /// Keep only headers named in [`ALLOWED_HEADERS`].
    pub fn filter_headers(raw: impl IntoIterator<Item = (String, String)>) -> BTreeMap<String, String> {
        raw.into_iter()
            .filter(|(name, _)| ALLOWED_HEADERS.contains(&name.to_ascii_lowercase().as_str()))
            .map(|(name, value)| (name.to_ascii_lowercase(), value))
            .collect()
    }
}

/// The stored visit metadata record — key `meta:{user}:{ts}`, TTL 90 days.
/// Field names are a storage compatibility contract; do not rename.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitMeta {
    pub referer: String,
    pub ip: String,
    pub date: DateTime<Utc>,
    #[serde(rename = "userAgent")]
    pub user_agent: String,
    pub headers: BTreeMap<String, String>,
    pub country: String,
    pub browser: String,
    #[serde(rename = "browserVersion")]
    pub browser_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
}

/// Stored per-user-agent detail — key `ua:{user}:{hash}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UaDetail {
    pub ua: String,
    pub count: u64,
}

/// Derive the referrer breakdown key from a raw `Referer` header value:
/// strip the `http(s)://` prefix, truncate at the first `/`, and fall back
/// to `"direct"` when nothing useful remains.
pub fn referrer_key(referer: &str) -> String {
    // Strip one scheme prefix only; a repeated prefix is part of the value.
    let stripped = referer
        .strip_prefix("https://")
        .or_else(|| referer.strip_prefix("http://"))
        .unwrap_or(referer);
    let host = stripped.split('/').next().unwrap_or("");
    if host.is_empty() {
        "direct".to_string()
    } else {
        host.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn referrer_key_strips_scheme_and_path() {
        assert_eq!(
            referrer_key("https://news.ycombinator.com/item?id=1"),
            "news.ycombinator.com"
        );
        assert_eq!(referrer_key("http://google.com/search"), "google.com");
    }

    #[test]
    fn referrer_key_empty_is_direct() {
        assert_eq!(referrer_key(""), "direct");
        assert_eq!(referrer_key("https://"), "direct");
    }

    #[test]
    fn referrer_key_without_scheme_passes_through() {
        assert_eq!(referrer_key("example.org/page"), "example.org");
    }

    #[test]
    fn referrer_key_strips_the_scheme_once_only() {
        assert_eq!(referrer_key("https://https://evil"), "https:");
        assert_eq!(referrer_key("http://http://x/y"), "http:");
    }

    #[test]
    fn filter_headers_drops_unlisted_names() {
        let raw = vec![
            ("Referer".to_string(), "https://a.example".to_string()),
            ("Cookie".to_string(), "secret=1".to_string()),
            ("CF-IPCountry".to_string(), "PL".to_string()),
        ];
        let kept = VisitEvent::filter_headers(raw);
        assert_eq!(kept.len(), 2);
        assert!(kept.contains_key("referer"));
        assert!(kept.contains_key("cf-ipcountry"));
        assert!(!kept.contains_key("cookie"));
    }
}
