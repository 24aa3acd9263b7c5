//! Read-side aggregation: reconstructs ranked breakdowns and scalar counts
//! from the counters and indices the recorder fans out to.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::bucket;
use crate::event::{UaDetail, VisitMeta};
use crate::keys::{self, Dimension, Scope};
use crate::store::Counters;

/// Hard cap on the recent-visits query, regardless of the caller's limit.
pub const RECENT_QUERY_MAX: usize = 100;

/// Breakdown dimensions exposed as ranked listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListDimension {
    Repos,
    Referrers,
    Countries,
    Browsers,
    Ips,
    UserAgents,
}

impl ListDimension {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "repos" => Some(Self::Repos),
            "referrers" => Some(Self::Referrers),
            "countries" => Some(Self::Countries),
            "browsers" => Some(Self::Browsers),
            "ips" => Some(Self::Ips),
            "uas" | "user-agents" => Some(Self::UserAgents),
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Repos => "Repositories",
            Self::Referrers => "Referrers",
            Self::Countries => "Countries",
            Self::Browsers => "Browsers",
            Self::Ips => "IPs",
            Self::UserAgents => "User Agents",
        }
    }
}

/// One row of a ranked listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedRow {
    pub label: String,
    pub count: u64,
}

/// One entry of the recent-visits query.
#[derive(Debug, Clone, Serialize)]
pub struct RecentVisit {
    pub ts: i64,
    #[serde(flatten)]
    pub meta: VisitMeta,
}

#[derive(Clone)]
pub struct StatsAggregator {
    counters: Counters,
}

impl StatsAggregator {
    pub fn new(counters: Counters) -> Self {
        Self { counters }
    }

    /// User-scope scalar for the bucket containing `now`. Absent key is 0.
    pub async fn user_scalar(&self, user: &str, scope: Scope, now: DateTime<Utc>) -> Result<u64> {
        let key = keys::user_counter(scope, user, current_bucket(scope, now).as_deref());
        self.counters.get_int(&key).await
    }

    /// Repo-scope scalar. The shell validates that `repo` is non-empty
    /// before calling (missing repo is a structured validation error, not a
    /// store lookup).
    pub async fn repo_scalar(
        &self,
        user: &str,
        repo: &str,
        scope: Scope,
        now: DateTime<Utc>,
    ) -> Result<u64> {
        let key = keys::repo_counter(scope, user, repo, current_bucket(scope, now).as_deref());
        self.counters.get_int(&key).await
    }

    /// Ranked breakdown for one dimension: read the index, fetch each
    /// member's counter (or UA detail), sort descending by count. The sort
    /// is stable, so equal counts keep first-seen order.
    pub async fn listing(&self, user: &str, dim: ListDimension) -> Result<Vec<RankedRow>> {
        let mut rows = match dim {
            ListDimension::UserAgents => self.ua_rows(user).await?,
            _ => self.counter_rows(user, dim).await?,
        };
        rows.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(rows)
    }

    async fn counter_rows(&self, user: &str, dim: ListDimension) -> Result<Vec<RankedRow>> {
        let (index_dim, counter_for) = match dim {
            ListDimension::Repos => (Dimension::Repo, None),
            ListDimension::Referrers => (Dimension::Referrer, Some(Dimension::Referrer)),
            ListDimension::Countries => (Dimension::Country, Some(Dimension::Country)),
            ListDimension::Browsers => (Dimension::Browser, Some(Dimension::Browser)),
            ListDimension::Ips => (Dimension::Ip, Some(Dimension::Ip)),
            ListDimension::UserAgents => unreachable!("handled by ua_rows"),
        };

        let members = self
            .counters
            .get_list(&keys::dimension_index(index_dim, user))
            .await?;

        let mut rows = Vec::with_capacity(members.len());
        for member in members {
            let key = match counter_for {
                Some(dim) => keys::dimension_counter(dim, user, &member),
                // Repo visits count through the repo-total counter family.
                None => keys::repo_counter(Scope::Total, user, &member, None),
            };
            let count = self.counters.get_int(&key).await?;
            rows.push(RankedRow { label: member, count });
        }
        Ok(rows)
    }

    async fn ua_rows(&self, user: &str) -> Result<Vec<RankedRow>> {
        let hashes = self
            .counters
            .get_list(&keys::dimension_index(Dimension::UserAgent, user))
            .await?;

        let mut rows = Vec::with_capacity(hashes.len());
        for hash in hashes {
            // A missing or corrupt detail record degrades to a zero row
            // labelled by hash rather than failing the whole listing.
            let detail: Option<UaDetail> =
                self.counters.get_json(&keys::ua_detail(user, &hash)).await?;
            let (label, count) = match detail {
                Some(d) => (d.ua, d.count),
                None => (hash, 0),
            };
            rows.push(RankedRow { label, count });
        }
        Ok(rows)
    }

    /// The `limit` most recent visits, newest first. Entries whose metadata
    /// record has already expired are silently skipped.
    pub async fn recent(&self, user: &str, limit: usize) -> Result<Vec<RecentVisit>> {
        let limit = limit.min(RECENT_QUERY_MAX);
        let index = self.counters.get_ts_list(&keys::meta_index(user)).await?;

        let newest_first = index.iter().rev().take(limit).copied();

        let mut visits = Vec::new();
        for ts in newest_first {
            if let Some(meta) = self.counters.get_json(&keys::meta(user, ts)).await? {
                visits.push(RecentVisit { ts, meta });
            }
        }
        Ok(visits)
    }
}

/// Bucket key for a scalar scope at `now`; `Total` has no bucket.
fn current_bucket(scope: Scope, now: DateTime<Utc>) -> Option<String> {
    match scope {
        Scope::Total => None,
        Scope::Daily => Some(bucket::day_str(now)),
        Scope::Weekly => Some(bucket::week_str(now)),
        Scope::Monthly => Some(bucket::month_str(now)),
        Scope::Yearly => Some(bucket::year_str(now)),
    }
}
