//! Storage key schema.
//!
//! Every key name here is a compatibility contract with data already in the
//! store; changing a pattern orphans existing counters.

/// Recent-visit index cap (oldest entries dropped first).
pub const RECENT_INDEX_CAP: usize = 5000;

/// Visit metadata TTL: 90 days, in seconds.
pub const META_TTL_SECONDS: u64 = 90 * 24 * 60 * 60;

/// Scalar counter scopes shared by users and repos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Total,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Total => "total",
            Scope::Daily => "daily",
            Scope::Weekly => "weekly",
            Scope::Monthly => "monthly",
            Scope::Yearly => "yearly",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "total" => Some(Scope::Total),
            "daily" => Some(Scope::Daily),
            "weekly" => Some(Scope::Weekly),
            "monthly" => Some(Scope::Monthly),
            "yearly" => Some(Scope::Yearly),
            _ => None,
        }
    }
}

pub fn meta(user: &str, ts_millis: i64) -> String {
    format!("meta:{user}:{ts_millis}")
}

pub fn meta_index(user: &str) -> String {
    format!("meta:index:{user}")
}

/// User-scope scalar counter: `total:{user}` or `{scope}:{user}:{bucket}`.
pub fn user_counter(scope: Scope, user: &str, bucket: Option<&str>) -> String {
    match bucket {
        Some(bucket) => format!("{}:{user}:{bucket}", scope.as_str()),
        None => format!("{}:{user}", scope.as_str()),
    }
}

/// Repo-scope scalar counter: the user family prefixed with `repo:` and the
/// repo name spliced in after the user.
pub fn repo_counter(scope: Scope, user: &str, repo: &str, bucket: Option<&str>) -> String {
    match bucket {
        Some(bucket) => format!("repo:{}:{user}:{repo}:{bucket}", scope.as_str()),
        None => format!("repo:{}:{user}:{repo}", scope.as_str()),
    }
}

/// Breakdown dimensions that carry an index plus per-value counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Repo,
    Referrer,
    Country,
    Browser,
    Ip,
    UserAgent,
}

impl Dimension {
    /// Key prefix, as written by the original fan-out.
    pub fn prefix(self) -> &'static str {
        match self {
            Dimension::Repo => "repo",
            Dimension::Referrer => "ref",
            Dimension::Country => "country",
            Dimension::Browser => "browser",
            Dimension::Ip => "ip",
            Dimension::UserAgent => "ua",
        }
    }
}

/// Index of distinct values seen for a dimension: `{prefix}:index:{user}`.
pub fn dimension_index(dim: Dimension, user: &str) -> String {
    format!("{}:index:{user}", dim.prefix())
}

/// Per-value counter for a dimension: `{prefix}:{user}:{value}`.
pub fn dimension_counter(dim: Dimension, user: &str, value: &str) -> String {
    format!("{}:{user}:{value}", dim.prefix())
}

/// User-agent detail record: `ua:{user}:{hash}`.
pub fn ua_detail(user: &str, hash: &str) -> String {
    format!("ua:{user}:{hash}")
}
