//! Port interfaces for reminder delivery
//!
//! These traits define the boundaries between the scanner and whatever
//! shows reminders to the user.

use async_trait::async_trait;
use medminder_domain::{DueReminder, Result, UserId};

/// Trait for surfacing a due reminder (dialog, notification, log line)
#[async_trait]
pub trait ReminderPresenter: Send + Sync {
    async fn present(&self, user_id: &UserId, reminder: &DueReminder) -> Result<()>;
}

/// Trait for asking the reminder loop to scan a user's doses now instead of
/// waiting for the next periodic tick. Fire-and-forget.
pub trait RescanTrigger: Send + Sync {
    fn request_rescan(&self, user_id: &UserId);
}
