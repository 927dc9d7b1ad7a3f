//! Due-dose scanner
//!
//! Finds the single dose a reminder should be shown for right now: the most
//! overdue dose that is scheduled today, inside its grace window, unresolved,
//! not snoozed to the cap and not waiting out a pending snooze.

use std::sync::Arc;

use chrono::NaiveDateTime;
use medminder_domain::{ClockTime, DueReminder, Medication, Result, UserId};
use tracing::{debug, instrument, warn};

use super::ledger::DoseLedger;
use crate::intake::IntakeService;
use crate::schedule::doses_on;
use crate::snooze::timers::TimerKind;

/// Minutes since `scheduled` when it falls inside the grace window, else `None`.
///
/// Works on minutes-of-day of the same calendar day; a window never wraps
/// past midnight.
pub fn due_minutes(now: ClockTime, scheduled: ClockTime, grace_period_minutes: u32) -> Option<u32> {
    let now = now.minutes_of_day();
    let scheduled = scheduled.minutes_of_day();
    let elapsed = now.checked_sub(scheduled)?;
    (elapsed <= grace_period_minutes).then_some(elapsed)
}

/// Scanner over a user's medications
pub struct ReminderScanner {
    intake: Arc<IntakeService>,
    ledger: Arc<DoseLedger>,
    grace_period_minutes: u32,
}

impl ReminderScanner {
    pub fn new(intake: Arc<IntakeService>, grace_period_minutes: u32) -> Self {
        let ledger = Arc::clone(intake.ledger());
        Self { intake, ledger, grace_period_minutes }
    }

    /// The most overdue eligible dose, or `None`.
    ///
    /// Never fails: a collaborator error is logged and reported as "nothing
    /// due" so the reminder loop keeps running.
    pub async fn scan_due(
        &self,
        user_id: &UserId,
        medications: &[Medication],
        now: NaiveDateTime,
    ) -> Option<DueReminder> {
        match self.try_scan_due(user_id, medications, now).await {
            Ok(reminder) => reminder,
            Err(err) => {
                warn!(user = %user_id, error = %err, "Reminder scan failed; treating as nothing due");
                None
            }
        }
    }

    /// Fallible form of [`Self::scan_due`].
    ///
    /// Ties on overdue minutes keep the first candidate in medication order.
    #[instrument(skip_all, fields(user = %user_id, medications = medications.len(), now = %now))]
    pub async fn try_scan_due(
        &self,
        user_id: &UserId,
        medications: &[Medication],
        now: NaiveDateTime,
    ) -> Result<Option<DueReminder>> {
        let current = ClockTime::from_naive_time(now.time());
        let mut best: Option<DueReminder> = None;

        for medication in medications {
            for dose in doses_on(medication, now.date()) {
                let Some(due) = due_minutes(current, dose.scheduled_time, self.grace_period_minutes)
                else {
                    continue;
                };
                if best.as_ref().is_some_and(|best| best.due_minutes >= due) {
                    continue;
                }
                if self.intake.is_resolved(user_id, medication, &dose).await? {
                    continue;
                }
                if self.intake.timers().is_armed(user_id, &dose, TimerKind::Snooze) {
                    debug!(dose = %dose, "Snooze pending; skipping");
                    continue;
                }
                let snooze_count = self.ledger.snooze_count(user_id, &dose).await?;
                if self.ledger.is_snooze_exhausted(snooze_count) {
                    debug!(dose = %dose, snooze_count, "Snooze cap reached; skipping");
                    continue;
                }
                best = Some(DueReminder {
                    medication: medication.clone(),
                    dose,
                    due_minutes: due,
                    snooze_count,
                });
            }
        }

        if let Some(reminder) = &best {
            debug!(dose = %reminder.dose, due_minutes = reminder.due_minutes, "Found due dose");
        }
        Ok(best)
    }
}
