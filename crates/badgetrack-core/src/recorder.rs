//! Write-side fan-out: one inbound visit updates a metadata record plus
//! roughly twenty counters and indices across six breakdown dimensions.

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::browser;
use crate::bucket;
use crate::event::{referrer_key, UaDetail, VisitEvent, VisitMeta};
use crate::keys::{self, Dimension, Scope};
use crate::store::Counters;

/// Records visits against an injected store.
#[derive(Clone)]
pub struct VisitRecorder {
    counters: Counters,
}

impl VisitRecorder {
    pub fn new(counters: Counters) -> Self {
        Self { counters }
    }

    /// Record one visit and return the user's updated total.
    ///
    /// The fan-out is awaited sequentially and is best-effort: a store
    /// failure aborts the remaining writes with no rollback, leaving a
    /// partially recorded visit. Concurrent visits racing on the same
    /// counter key may lose increments (read-then-write, last writer wins).
    pub async fn record(&self, event: &VisitEvent) -> Result<u64> {
        self.record_at(event, Utc::now()).await
    }

    /// Like [`record`](Self::record) with an explicit timestamp, which keeps
    /// bucket arithmetic deterministic under test.
    pub async fn record_at(&self, event: &VisitEvent, now: DateTime<Utc>) -> Result<u64> {
        let user = event.user.as_str();
        let ts = now.timestamp_millis();

        let (browser_name, browser_version) = browser::classify(&event.user_agent);

        // 1. Metadata record, expiring after 90 days. Two visits in the same
        // millisecond share a key and the later write wins; accepted.
        let meta = VisitMeta {
            referer: event.referer.clone(),
            ip: event.ip.clone(),
            date: now,
            user_agent: event.user_agent.clone(),
            headers: event.headers.clone(),
            country: event.country.clone(),
            browser: browser_name.clone(),
            browser_version: browser_version.clone(),
            repo: event.repo.clone(),
        };
        self.counters
            .put_json(&keys::meta(user, ts), &meta, Some(keys::META_TTL_SECONDS))
            .await?;

        // 2. Recent-visit index, capped FIFO.
        self.counters
            .push_capped(&keys::meta_index(user), ts, keys::RECENT_INDEX_CAP)
            .await?;

        // 3. User-scope scalar counters: total + the four time buckets.
        let total = self
            .counters
            .incr(&keys::user_counter(Scope::Total, user, None))
            .await?;
        for (scope, bucket) in time_buckets(now) {
            self.counters
                .incr(&keys::user_counter(scope, user, Some(&bucket)))
                .await?;
        }

        // 4. Repo family, only when the event names a repo.
        if let Some(repo) = event.repo.as_deref().filter(|r| !r.is_empty()) {
            self.counters
                .add_to_index(&keys::dimension_index(Dimension::Repo, user), repo)
                .await?;
            self.counters
                .incr(&keys::repo_counter(Scope::Total, user, repo, None))
                .await?;
            for (scope, bucket) in time_buckets(now) {
                self.counters
                    .incr(&keys::repo_counter(scope, user, repo, Some(&bucket)))
                    .await?;
            }
        }

        // 5. Referrer.
        let referrer = referrer_key(&event.referer);
        self.bump_dimension(Dimension::Referrer, user, &referrer).await?;

        // 6. Country, verbatim from the request header ("XX" default is the
        // shell's job).
        self.bump_dimension(Dimension::Country, user, &event.country).await?;

        // 7. Browser, composite name:version key.
        let browser = browser::browser_key(&browser_name, &browser_version);
        self.bump_dimension(Dimension::Browser, user, &browser).await?;

        // 8. IP.
        self.bump_dimension(Dimension::Ip, user, &event.ip).await?;

        // 9. User-agent hash index plus detail record.
        let hash = browser::ua_hash(&event.user_agent);
        self.counters
            .add_to_index(&keys::dimension_index(Dimension::UserAgent, user), &hash)
            .await?;
        let detail_key = keys::ua_detail(user, &hash);
        let mut detail: UaDetail = self
            .counters
            .get_json(&detail_key)
            .await?
            .unwrap_or(UaDetail {
                ua: event.user_agent.clone(),
                count: 0,
            });
        detail.count += 1;
        self.counters.put_json(&detail_key, &detail, None).await?;

        tracing::debug!(user, total, "visit recorded");
        Ok(total)
    }

    async fn bump_dimension(&self, dim: Dimension, user: &str, value: &str) -> Result<()> {
        self.counters
            .add_to_index(&keys::dimension_index(dim, user), value)
            .await?;
        self.counters
            .incr(&keys::dimension_counter(dim, user, value))
            .await?;
        Ok(())
    }
}

/// The four bucketed scopes and their keys for `now`.
fn time_buckets(now: DateTime<Utc>) -> [(Scope, String); 4] {
    [
        (Scope::Daily, bucket::day_str(now)),
        (Scope::Weekly, bucket::week_str(now)),
        (Scope::Monthly, bucket::month_str(now)),
        (Scope::Yearly, bucket::year_str(now)),
    ]
}
