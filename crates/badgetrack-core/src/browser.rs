//! User-agent classification and hashing.

use std::sync::OnceLock;

use regex::Regex;

/// Ordered classification rules. Order is load-bearing: several patterns are
/// substrings of later ones (Edge and Opera ship a `Chrome/` token; Chrome
/// ships a `Safari` token), so the first match must win.
const RULES: &[(&str, &str)] = &[
    ("Edge", r"Edg(?:e|A|iOS)?/([0-9.]+)"),
    ("Opera", r"OPR/([0-9.]+)"),
    ("Opera", r"Opera[/ ]([0-9.]+)"),
    ("Samsung Internet", r"SamsungBrowser/([0-9.]+)"),
    ("UC Browser", r"UCBrowser/([0-9.]+)"),
    ("Firefox", r"Firefox/([0-9.]+)"),
    ("Internet Explorer", r"MSIE ([0-9.]+)"),
    ("Internet Explorer", r"Trident/.*rv:([0-9.]+)"),
    ("Chrome", r"Chrome/([0-9.]+)"),
    // Safari must require the trailing Safari token after Version/ so a
    // Chrome UA (which also ends in "Safari/605") is not misclassified.
    ("Safari", r"Version/([0-9.]+).*Safari"),
];

fn compiled_rules() -> &'static Vec<(&'static str, Regex)> {
    static COMPILED: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        RULES
            .iter()
            .filter_map(|(name, pattern)| Regex::new(pattern).ok().map(|re| (*name, re)))
            .collect()
    })
}

/// Classify a raw user-agent string into `(browser_name, version)`.
///
/// Total for any input: an unmatched string containing "mobile"
/// (case-insensitive) yields `("Mobile Browser", "0")`, anything else
/// `("Unknown", "0")`.
pub fn classify(user_agent: &str) -> (String, String) {
    for (name, re) in compiled_rules() {
        if let Some(caps) = re.captures(user_agent) {
            let version = caps
                .get(1)
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| "0".to_string());
            return (name.to_string(), version);
        }
    }
    if user_agent.to_ascii_lowercase().contains("mobile") {
        ("Mobile Browser".to_string(), "0".to_string())
    } else {
        ("Unknown".to_string(), "0".to_string())
    }
}

/// Composite index/counter key component for a classified browser.
pub fn browser_key(name: &str, version: &str) -> String {
    format!("{name}:{version}")
}

/// Order-sensitive polynomial hash of a user-agent string, folded to a
/// positive base-36 string.
///
/// Runs `h = h * 31 + unit` over the UTF-16 code units with i32 wrapping,
/// matching the representation historic `ua:{user}:{hash}` keys were written
/// with. Distinct strings can collide and merge counts; that is a documented
/// limitation of the scheme, not something to fix with a different hash.
pub fn ua_hash(user_agent: &str) -> String {
    let mut h: i32 = 0;
    for unit in user_agent.encode_utf16() {
        h = h.wrapping_mul(31).wrapping_add(i32::from(unit));
    }
    to_base36(u64::from(h.unsigned_abs()))
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

    #[test]
    fn edge_wins_over_chrome() {
        let (name, version) = classify(
            "Mozilla/5.0 (Windows NT 10.0) AppleWebKit/537.36 Chrome/99.0 Safari/537.36 Edg/100.0",
        );
        assert_eq!(name, "Edge");
        assert_eq!(version, "100.0");
    }

    #[test]
    fn opera_wins_over_chrome() {
        let (name, version) = classify(
            "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 Chrome/119.0 Safari/537.36 OPR/105.0.0.0",
        );
        assert_eq!(name, "Opera");
        assert_eq!(version, "105.0.0.0");
    }

    #[test]
    fn chrome_is_not_safari() {
        let (name, version) = classify(CHROME_UA);
        assert_eq!(name, "Chrome");
        assert_eq!(version, "120.0.0.0");
    }

    #[test]
    fn safari_requires_version_token() {
        let (name, version) = classify(
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 \
             (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
        );
        assert_eq!(name, "Safari");
        assert_eq!(version, "17.1");
    }

    #[test]
    fn firefox_matches() {
        let (name, version) =
            classify("Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0");
        assert_eq!(name, "Firefox");
        assert_eq!(version, "121.0");
    }

    #[test]
    fn ie11_matches_trident() {
        let (name, version) =
            classify("Mozilla/5.0 (Windows NT 6.1; Trident/7.0; rv:11.0) like Gecko");
        assert_eq!(name, "Internet Explorer");
        assert_eq!(version, "11.0");
    }

    #[test]
    fn unmatched_mobile_fallback() {
        let (name, version) = classify("SomeWeird Mobile Thing/1.0");
        assert_eq!(name, "Mobile Browser");
        assert_eq!(version, "0");
    }

    #[test]
    fn empty_string_is_unknown() {
        assert_eq!(classify(""), ("Unknown".to_string(), "0".to_string()));
    }

    #[test]
    fn ua_hash_is_deterministic_and_base36() {
        let a = ua_hash(CHROME_UA);
        let b = ua_hash(CHROME_UA);
        assert_eq!(a, b);
        assert!(!a.is_empty());
        assert!(a.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn ua_hash_empty_is_zero() {
        assert_eq!(ua_hash(""), "0");
    }

    #[test]
    fn ua_hash_is_order_sensitive() {
        assert_ne!(ua_hash("ab"), ua_hash("ba"));
    }
}
