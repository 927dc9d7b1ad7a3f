//! Per-dose cache ledger
//!
//! Records, per dose instance, whether it is already resolved and how many
//! times it has been snoozed. Keys follow `{prefix}_{user}_{medication}_{date}_{time}`.

use std::sync::Arc;

use medminder_domain::constants::{RESOLVED_CACHE_PREFIX, SNOOZE_CACHE_PREFIX};
use medminder_domain::{DoseInstance, IntakeStatus, Result, UserId};
use tracing::debug;

use crate::cache_ports::LocalCache;

/// Snooze counters and resolution markers over a [`LocalCache`].
pub struct DoseLedger {
    cache: Arc<dyn LocalCache>,
    max_snoozes: u32,
}

impl DoseLedger {
    pub fn new(cache: Arc<dyn LocalCache>, max_snoozes: u32) -> Self {
        Self { cache, max_snoozes }
    }

    pub fn max_snoozes(&self) -> u32 {
        self.max_snoozes
    }

    /// Cached status of the dose, if it was resolved on this device.
    pub async fn resolved_status(
        &self,
        user_id: &UserId,
        dose: &DoseInstance,
    ) -> Result<Option<IntakeStatus>> {
        let raw = self.cache.get(&resolved_key(user_id, dose)).await?;
        // unreadable markers count as absent; the store decides
        Ok(raw.and_then(|value| value.parse().ok()))
    }

    pub async fn mark_resolved(
        &self,
        user_id: &UserId,
        dose: &DoseInstance,
        status: IntakeStatus,
    ) -> Result<()> {
        self.cache.set(&resolved_key(user_id, dose), status.to_string()).await
    }

    pub async fn clear_resolved(&self, user_id: &UserId, dose: &DoseInstance) -> Result<()> {
        self.cache.remove(&resolved_key(user_id, dose)).await
    }

    pub async fn snooze_count(&self, user_id: &UserId, dose: &DoseInstance) -> Result<u32> {
        let raw = self.cache.get(&snooze_key(user_id, dose)).await?;
        Ok(raw.and_then(|value| value.parse().ok()).unwrap_or(0))
    }

    /// Increment the snooze counter, saturating at the configured maximum.
    /// Returns the new count.
    pub async fn record_snooze(&self, user_id: &UserId, dose: &DoseInstance) -> Result<u32> {
        let count = self.snooze_count(user_id, dose).await?.saturating_add(1).min(self.max_snoozes);
        self.cache.set(&snooze_key(user_id, dose), count.to_string()).await?;
        debug!(dose = %dose, count, max = self.max_snoozes, "Recorded snooze");
        Ok(count)
    }

    pub async fn reset_snoozes(&self, user_id: &UserId, dose: &DoseInstance) -> Result<()> {
        self.cache.remove(&snooze_key(user_id, dose)).await
    }

    pub fn is_snooze_exhausted(&self, count: u32) -> bool {
        count >= self.max_snoozes
    }
}

pub fn resolved_key(user_id: &UserId, dose: &DoseInstance) -> String {
    dose_key(RESOLVED_CACHE_PREFIX, user_id, dose)
}

pub fn snooze_key(user_id: &UserId, dose: &DoseInstance) -> String {
    dose_key(SNOOZE_CACHE_PREFIX, user_id, dose)
}

fn dose_key(prefix: &str, user_id: &UserId, dose: &DoseInstance) -> String {
    format!("{prefix}_{user_id}_{}_{}_{}", dose.medication_id, dose.date, dose.scheduled_time)
}
