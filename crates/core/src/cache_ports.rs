//! Device-local key/value cache port.
//!
//! The cache is a fast path for "already resolved?" and snooze-count
//! lookups. The intake log store stays the source of truth: a missing or
//! stale cache entry must never change a dose's derived state.

use async_trait::async_trait;
use medminder_domain::Result;

/// Port for a string key/value cache local to the device.
#[async_trait]
pub trait LocalCache: Send + Sync {
    /// Read a value; `None` when the key is absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Insert or overwrite a value.
    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Remove a key. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}
