//! One reminder-loop pass for the watched users
//!
//! Each pass lists the user's medications, optionally marks expired doses
//! missed, then presents the most overdue eligible dose and arms its grace
//! timer.

use std::collections::BTreeSet;
use std::sync::Arc;

use medminder_core::{
    Clock, MedicationStore, ReminderPresenter, ReminderScanner, SnoozeCoordinator,
};
use medminder_domain::{DueReminder, IntakeLogEntry, Result, UserId};
use parking_lot::RwLock;
use tracing::{debug, info, instrument, warn};

/// What a single scan did for one user
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub reminder: Option<DueReminder>,
    /// Doses the sweep marked missed during this pass.
    pub expired: Vec<IntakeLogEntry>,
}

pub struct ReminderJob {
    medications: Arc<dyn MedicationStore>,
    scanner: Arc<ReminderScanner>,
    snooze: Arc<SnoozeCoordinator>,
    presenter: Arc<dyn ReminderPresenter>,
    clock: Arc<dyn Clock>,
    sweep_missed: bool,
    users: RwLock<BTreeSet<UserId>>,
}

impl ReminderJob {
    pub fn new(
        medications: Arc<dyn MedicationStore>,
        scanner: Arc<ReminderScanner>,
        snooze: Arc<SnoozeCoordinator>,
        presenter: Arc<dyn ReminderPresenter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            medications,
            scanner,
            snooze,
            presenter,
            clock,
            sweep_missed: true,
            users: RwLock::default(),
        }
    }

    #[must_use]
    pub fn with_sweep(mut self, sweep_missed: bool) -> Self {
        self.sweep_missed = sweep_missed;
        self
    }

    /// Include a user in periodic scans. Returns false if already watched.
    pub fn watch(&self, user_id: UserId) -> bool {
        self.users.write().insert(user_id)
    }

    pub fn unwatch(&self, user_id: &UserId) -> bool {
        self.users.write().remove(user_id)
    }

    pub fn watched(&self) -> Vec<UserId> {
        self.users.read().iter().cloned().collect()
    }

    /// Scan one user.
    ///
    /// # Errors
    /// Medication store and presenter failures. Scanner and sweep failures
    /// are logged inside core and never surface here.
    #[instrument(skip_all, fields(user = %user_id))]
    pub async fn run_scan(&self, user_id: &UserId) -> Result<ScanReport> {
        let medications = self.medications.list(user_id).await?;
        let now = self.clock.now();

        let expired = if self.sweep_missed {
            self.snooze.sweep_expired(user_id, &medications, now).await
        } else {
            Vec::new()
        };

        let reminder = self.scanner.scan_due(user_id, &medications, now).await;
        if let Some(reminder) = &reminder {
            if self.snooze.schedule_grace_expiry(user_id, &reminder.dose).is_some() {
                debug!(dose = %reminder.dose, "Armed grace timer");
            }
            self.presenter.present(user_id, reminder).await?;
            info!(
                dose = %reminder.dose,
                due_minutes = reminder.due_minutes,
                snooze_count = reminder.snooze_count,
                "Reminder presented"
            );
        }
        Ok(ScanReport { reminder, expired })
    }

    /// Scan every watched user. Returns how many reminders were presented;
    /// per-user failures are logged and do not stop the pass.
    pub async fn run_all(&self) -> usize {
        let mut presented = 0;
        for user_id in self.watched() {
            match self.run_scan(&user_id).await {
                Ok(report) => presented += usize::from(report.reminder.is_some()),
                Err(err) => warn!(user = %user_id, error = %err, "Reminder scan failed"),
            }
        }
        presented
    }
}
