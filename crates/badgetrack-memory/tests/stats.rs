use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{TimeZone, Utc};

use badgetrack_core::event::VisitEvent;
use badgetrack_core::keys::Scope;
use badgetrack_core::recorder::VisitRecorder;
use badgetrack_core::stats::{ListDimension, RankedRow, StatsAggregator};
use badgetrack_core::store::Counters;
use badgetrack_memory::MemoryStore;

fn counters() -> Counters {
    Counters::new(Arc::new(MemoryStore::new()))
}

fn event(user: &str, referer: &str, ip: &str) -> VisitEvent {
    VisitEvent {
        user: user.to_string(),
        repo: None,
        ip: ip.to_string(),
        country: "XX".to_string(),
        referer: referer.to_string(),
        user_agent: "Mozilla/5.0 Chrome/120.0 Safari/537.36".to_string(),
        headers: BTreeMap::new(),
    }
}

#[tokio::test]
async fn scalar_on_empty_store_is_zero() {
    let stats = StatsAggregator::new(counters());
    let now = Utc::now();
    assert_eq!(stats.user_scalar("ghost", Scope::Total, now).await.unwrap(), 0);
    assert_eq!(stats.user_scalar("ghost", Scope::Daily, now).await.unwrap(), 0);
    assert_eq!(
        stats
            .repo_scalar("ghost", "widget", Scope::Weekly, now)
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn scalar_reads_current_bucket_only() {
    let counters = counters();
    let recorder = VisitRecorder::new(counters.clone());
    let stats = StatsAggregator::new(counters);

    let yesterday = Utc.with_ymd_and_hms(2025, 3, 6, 23, 0, 0).single().unwrap();
    let today = Utc.with_ymd_and_hms(2025, 3, 7, 1, 0, 0).single().unwrap();
    recorder
        .record_at(&event("alice", "", "1.1.1.1"), yesterday)
        .await
        .unwrap();
    recorder
        .record_at(&event("alice", "", "1.1.1.1"), today)
        .await
        .unwrap();

    assert_eq!(stats.user_scalar("alice", Scope::Total, today).await.unwrap(), 2);
    assert_eq!(stats.user_scalar("alice", Scope::Daily, today).await.unwrap(), 1);
    assert_eq!(stats.user_scalar("alice", Scope::Monthly, today).await.unwrap(), 2);
}

#[tokio::test]
async fn listing_sorts_descending_with_stable_ties() {
    let counters = counters();
    let recorder = VisitRecorder::new(counters.clone());
    let stats = StatsAggregator::new(counters);

    // b.example seen first, then a.example twice, then c.example once:
    // ranking is a (2), then b and c tied at 1 in first-seen order.
    recorder
        .record(&event("alice", "https://b.example/x", "1.1.1.1"))
        .await
        .unwrap();
    recorder
        .record(&event("alice", "https://a.example/x", "1.1.1.1"))
        .await
        .unwrap();
    recorder
        .record(&event("alice", "https://a.example/y", "1.1.1.1"))
        .await
        .unwrap();
    recorder
        .record(&event("alice", "https://c.example/x", "1.1.1.1"))
        .await
        .unwrap();

    let rows = stats.listing("alice", ListDimension::Referrers).await.unwrap();
    assert_eq!(
        rows,
        vec![
            RankedRow {
                label: "a.example".to_string(),
                count: 2
            },
            RankedRow {
                label: "b.example".to_string(),
                count: 1
            },
            RankedRow {
                label: "c.example".to_string(),
                count: 1
            },
        ]
    );
}

#[tokio::test]
async fn ua_listing_resolves_hashes_to_original_strings() {
    let counters = counters();
    let recorder = VisitRecorder::new(counters.clone());
    let stats = StatsAggregator::new(counters);

    let e = event("alice", "", "1.1.1.1");
    recorder.record(&e).await.unwrap();
    recorder.record(&e).await.unwrap();

    let rows = stats.listing("alice", ListDimension::UserAgents).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].label, e.user_agent);
    assert_eq!(rows[0].count, 2);
}

#[tokio::test]
async fn corrupt_rows_degrade_instead_of_failing_the_listing() {
    let counters = counters();
    let stats = StatsAggregator::new(counters.clone());

    // Index references two referrers; one counter value is garbage.
    counters
        .put_json("ref:index:alice", &vec!["good.example", "bad.example"], None)
        .await
        .unwrap();
    counters
        .store()
        .put("ref:alice:good.example", "3", None)
        .await
        .unwrap();
    counters
        .store()
        .put("ref:alice:bad.example", "not-a-number", None)
        .await
        .unwrap();

    let rows = stats.listing("alice", ListDimension::Referrers).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].label, "good.example");
    assert_eq!(rows[0].count, 3);
    assert_eq!(rows[1].count, 0);
}

#[tokio::test]
async fn ua_listing_with_missing_detail_falls_back_to_hash() {
    let counters = counters();
    let stats = StatsAggregator::new(counters.clone());

    counters
        .put_json("ua:index:alice", &vec!["deadbeef"], None)
        .await
        .unwrap();

    let rows = stats.listing("alice", ListDimension::UserAgents).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].label, "deadbeef");
    assert_eq!(rows[0].count, 0);
}

#[tokio::test]
async fn recent_returns_newest_first_and_respects_limit() {
    let counters = counters();
    let recorder = VisitRecorder::new(counters.clone());
    let stats = StatsAggregator::new(counters);

    let base = Utc.with_ymd_and_hms(2025, 3, 7, 12, 0, 0).single().unwrap();
    for i in 0..5 {
        let at = base + chrono::Duration::milliseconds(i);
        recorder
            .record_at(&event("alice", "", "1.1.1.1"), at)
            .await
            .unwrap();
    }

    let visits = stats.recent("alice", 3).await.unwrap();
    assert_eq!(visits.len(), 3);
    assert!(visits[0].ts > visits[1].ts && visits[1].ts > visits[2].ts);
    assert_eq!(visits[0].ts, base.timestamp_millis() + 4);
}

#[tokio::test]
async fn recent_reads_a_legacy_numeric_index() {
    let counters = counters();
    let recorder = VisitRecorder::new(counters.clone());
    let stats = StatsAggregator::new(counters.clone());

    // Write one visit normally, then rewrite the index the way the original
    // system stored it: a JSON array of numbers.
    let at = Utc.with_ymd_and_hms(2025, 3, 7, 12, 0, 0).single().unwrap();
    recorder
        .record_at(&event("alice", "", "1.1.1.1"), at)
        .await
        .unwrap();
    let ts = at.timestamp_millis();
    counters
        .store()
        .put("meta:index:alice", &format!("[{ts}]"), None)
        .await
        .unwrap();

    let visits = stats.recent("alice", 10).await.unwrap();
    assert_eq!(visits.len(), 1);
    assert_eq!(visits[0].ts, ts);
    assert_eq!(visits[0].meta.country, "XX");
}

#[tokio::test]
async fn recent_skips_entries_whose_metadata_expired() {
    let counters = counters();
    let recorder = VisitRecorder::new(counters.clone());
    let stats = StatsAggregator::new(counters.clone());

    let base = Utc.with_ymd_and_hms(2025, 3, 7, 12, 0, 0).single().unwrap();
    recorder
        .record_at(&event("alice", "", "1.1.1.1"), base)
        .await
        .unwrap();
    recorder
        .record_at(
            &event("alice", "", "1.1.1.1"),
            base + chrono::Duration::milliseconds(1),
        )
        .await
        .unwrap();

    // Simulate the first record's TTL expiring: overwrite with ttl 0.
    let expired_key = badgetrack_core::keys::meta("alice", base.timestamp_millis());
    counters.store().put(&expired_key, "{}", Some(0)).await.unwrap();

    let visits = stats.recent("alice", 10).await.unwrap();
    assert_eq!(visits.len(), 1);
    assert_eq!(visits[0].ts, base.timestamp_millis() + 1);
}
