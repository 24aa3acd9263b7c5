//! In-memory [`KvStore`] implementation with per-key expiry.
//!
//! The shipped self-host backend and the test double for everything built on
//! the store trait. TTLs are enforced lazily: an expired entry is treated as
//! absent on read and dropped at that point.

use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use badgetrack_core::store::KvStore;

struct Entry {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (non-expired) keys; test helper.
    pub async fn len(&self) -> usize {
        let now = Utc::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|e| e.expires_at.map_or(true, |at| at > now))
            .count()
    }
}

#[async_trait::async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some(e) if e.expires_at.map_or(true, |at| at > Utc::now()) => {
                    return Ok(Some(e.value.clone()))
                }
                Some(_) => {} // expired, fall through to prune
            }
        }
        self.entries.write().await.remove(key);
        Ok(None)
    }

    async fn put(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> Result<()> {
        let expires_at = ttl_seconds.map(|s| Utc::now() + Duration::seconds(s as i64));
        self.entries.write().await.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }
}
