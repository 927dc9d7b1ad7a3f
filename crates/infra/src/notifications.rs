//! Reminder delivery adapters
//!
//! The engine runs headless, so scheduled notifications are tracked in
//! memory and announced through `tracing`. [`ChannelReminderPresenter`]
//! hands due reminders to whatever front end owns the receiver.

use std::collections::HashMap;

use async_trait::async_trait;
use medminder_core::{NotificationHandle, NotificationScheduler, ReminderPresenter};
use medminder_domain::{ClockTime, DueReminder, MedMinderError, MedicationId, Result, UserId};
use parking_lot::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};
use uuid::Uuid;

/// Repeating daily reminders kept in memory and logged.
#[derive(Default)]
pub struct TracingNotificationScheduler {
    active: Mutex<HashMap<NotificationHandle, (MedicationId, ClockTime)>>,
}

impl TracingNotificationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reminders currently scheduled, ordered by time of day.
    pub fn scheduled(&self) -> Vec<(MedicationId, ClockTime)> {
        let mut scheduled: Vec<_> = self.active.lock().values().cloned().collect();
        scheduled.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        scheduled
    }
}

#[async_trait]
impl NotificationScheduler for TracingNotificationScheduler {
    async fn schedule_repeating_reminder(
        &self,
        medication_id: &MedicationId,
        time: ClockTime,
    ) -> Result<NotificationHandle> {
        let handle = NotificationHandle(Uuid::now_v7().to_string());
        self.active.lock().insert(handle.clone(), (medication_id.clone(), time));
        info!(medication = %medication_id, %time, handle = %handle, "Daily reminder scheduled");
        Ok(handle)
    }

    async fn cancel(&self, handle: &NotificationHandle) -> Result<()> {
        if let Some((medication_id, time)) = self.active.lock().remove(handle) {
            debug!(medication = %medication_id, %time, handle = %handle, "Daily reminder cancelled");
        }
        Ok(())
    }
}

/// Presenter that only logs the reminder.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReminderPresenter;

#[async_trait]
impl ReminderPresenter for TracingReminderPresenter {
    async fn present(&self, user_id: &UserId, reminder: &DueReminder) -> Result<()> {
        info!(
            user = %user_id,
            medication = %reminder.medication.name,
            scheduled = %reminder.scheduled_time(),
            due_minutes = reminder.due_minutes,
            snooze_count = reminder.snooze_count,
            "Time to take your medication"
        );
        Ok(())
    }
}

/// Presenter forwarding reminders over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelReminderPresenter {
    sender: UnboundedSender<(UserId, DueReminder)>,
}

impl ChannelReminderPresenter {
    pub fn channel() -> (Self, UnboundedReceiver<(UserId, DueReminder)>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl ReminderPresenter for ChannelReminderPresenter {
    async fn present(&self, user_id: &UserId, reminder: &DueReminder) -> Result<()> {
        self.sender
            .send((user_id.clone(), reminder.clone()))
            .map_err(|_| MedMinderError::Notification("reminder receiver closed".into()))
    }
}
