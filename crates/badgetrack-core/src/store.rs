//! Key-value store abstraction and the typed counter adapter on top of it.

use std::sync::Arc;

use anyhow::Result;
use serde::{de::DeserializeOwned, Serialize};

/// The opaque external string store.
///
/// Injected explicitly into every component (no process-wide singleton) so
/// tests can substitute the in-memory implementation. The store offers no
/// multi-key transactions; everything above it is built on plain get/put.
#[async_trait::async_trait]
pub trait KvStore: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, optionally expiring it after `ttl_seconds`.
    async fn put(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> Result<()>;
}

/// Typed operations over the raw string store.
///
/// Increments are read-then-write: concurrent writers to the same key can
/// lose updates, which makes every counter an approximate count. That is the
/// consistency contract of this system, not a bug to lock away.
#[derive(Clone)]
pub struct Counters {
    store: Arc<dyn KvStore>,
}

impl Counters {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn KvStore> {
        &self.store
    }

    /// Read a counter. Absent key is 0; a malformed value is treated as
    /// store corruption and degrades to 0 for this one key.
    pub async fn get_int(&self, key: &str) -> Result<u64> {
        Ok(self
            .store
            .get(key)
            .await?
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .unwrap_or(0))
    }

    /// Increment a counter and return its new value.
    pub async fn incr(&self, key: &str) -> Result<u64> {
        let next = self.get_int(key).await?.saturating_add(1);
        self.store.put(key, &next.to_string(), None).await?;
        Ok(next)
    }

    /// Read a JSON value. Absent key or unparseable JSON is `None`; a parse
    /// failure is logged at debug and otherwise swallowed so one corrupt
    /// record cannot fail a whole listing.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::debug!(key, error = %e, "skipping malformed stored JSON");
                Ok(None)
            }
        }
    }

    pub async fn put_json<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: Option<u64>,
    ) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.store.put(key, &raw, ttl_seconds).await
    }

    /// Read a stored JSON string array, used for the dimension indices.
    pub async fn get_list(&self, key: &str) -> Result<Vec<String>> {
        Ok(self.get_json(key).await?.unwrap_or_default())
    }

    /// Read a stored JSON timestamp array. Existing data holds millisecond
    /// epochs as JSON numbers, so numbers are the canonical encoding;
    /// string entries are tolerated on read and anything else is dropped.
    pub async fn get_ts_list(&self, key: &str) -> Result<Vec<i64>> {
        let raw: Vec<serde_json::Value> = self.get_json(key).await?.unwrap_or_default();
        Ok(raw
            .into_iter()
            .filter_map(|v| match v {
                serde_json::Value::Number(n) => n.as_i64(),
                serde_json::Value::String(s) => s.parse().ok(),
                _ => None,
            })
            .collect())
    }

    /// Append `value` to the index at `key` unless already present.
    /// Returns whether the value was appended (first-seen order preserved).
    pub async fn add_to_index(&self, key: &str, value: &str) -> Result<bool> {
        let mut members = self.get_list(key).await?;
        if members.iter().any(|m| m == value) {
            return Ok(false);
        }
        members.push(value.to_string());
        self.put_json(key, &members, None).await?;
        Ok(true)
    }

    /// Append a timestamp to a FIFO list capped at `cap`, dropping the
    /// oldest entries once full. Writes JSON numbers, the encoding existing
    /// `meta:index:` data was stored with.
    pub async fn push_capped(&self, key: &str, ts: i64, cap: usize) -> Result<()> {
        let mut members = self.get_ts_list(key).await?;
        members.push(ts);
        if members.len() > cap {
            let excess = members.len() - cap;
            members.drain(..excess);
        }
        self.put_json(key, &members, None).await
    }
}
