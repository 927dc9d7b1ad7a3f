//! Local notification port.
//!
//! Core only decides when a repeating daily reminder must be (re)scheduled
//! or cancelled; delivery belongs to the platform adapter.

use async_trait::async_trait;
use medminder_domain::{ClockTime, MedicationId, Result};
use serde::{Deserialize, Serialize};

/// Opaque handle for a scheduled notification, used to cancel it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationHandle(pub String);

impl NotificationHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NotificationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Port for scheduling repeating daily reminders.
#[async_trait]
pub trait NotificationScheduler: Send + Sync {
    /// Schedule a reminder that repeats every day at `time`.
    async fn schedule_repeating_reminder(
        &self,
        medication_id: &MedicationId,
        time: ClockTime,
    ) -> Result<NotificationHandle>;

    /// Cancel a previously scheduled reminder. Unknown handles are ignored.
    async fn cancel(&self, handle: &NotificationHandle) -> Result<()>;
}
