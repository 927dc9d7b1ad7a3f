//! Resolved-dose and snooze-count cache backed by moka
//!
//! Entries expire after the configured TTL. Keys are day-scoped, so expiry
//! only reclaims memory; correctness never depends on an entry surviving.

use std::time::Duration;

use async_trait::async_trait;
use medminder_core::LocalCache;
use medminder_domain::{CacheConfig, Result};
use moka::sync::Cache;

/// In-memory [`LocalCache`] with TTL and bounded capacity
#[derive(Clone)]
pub struct MokaLocalCache {
    entries: Cache<String, String>,
}

impl MokaLocalCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_ttl(config.max_entries, Duration::from_secs(config.ttl_hours.saturating_mul(3600)))
    }

    /// Create a cache with an explicit TTL (useful for testing)
    pub fn with_ttl(max_capacity: u64, ttl: Duration) -> Self {
        tracing::info!(
            ttl_seconds = ttl.as_secs(),
            max_capacity,
            "Local cache configuration loaded"
        );
        let entries = Cache::builder().max_capacity(max_capacity).time_to_live(ttl).build();
        Self { entries }
    }

    pub fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    pub fn invalidate_all(&self) {
        self.entries.invalidate_all();
    }
}

#[async_trait]
impl LocalCache for MokaLocalCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key))
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.invalidate(key);
        Ok(())
    }
}
