//! Port interfaces for intake history
//!
//! The intake log is append-only from core's point of view: entries are
//! appended or deleted, never edited.

use std::sync::Arc;

use async_trait::async_trait;
use medminder_domain::{IntakeLogEntry, IntakeLogId, Result, UserId};

use crate::subscription::Subscription;

/// Listener invoked with the user's full intake log on every change.
pub type IntakeLogListener = Arc<dyn Fn(Vec<IntakeLogEntry>) + Send + Sync>;

/// Trait for persisting intake log entries
#[async_trait]
pub trait IntakeLogStore: Send + Sync {
    /// Append an entry and return the identifier the store assigned.
    async fn append(&self, user_id: &UserId, entry: IntakeLogEntry) -> Result<IntakeLogId>;

    /// All entries of a user, in no particular order.
    async fn list(&self, user_id: &UserId) -> Result<Vec<IntakeLogEntry>>;

    /// Register a listener for live updates of a user's log.
    fn subscribe(&self, user_id: &UserId, listener: IntakeLogListener) -> Result<Subscription>;

    async fn delete(&self, entry_id: &IntakeLogId) -> Result<()>;
}
