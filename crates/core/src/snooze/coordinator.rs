//! Snooze coordinator
//!
//! A due dose may be snoozed a bounded number of times. Each snooze arms a
//! timer that asks the reminder loop to re-scan once it elapses. Independent
//! of snoozing, a dose left unresolved past its grace period is marked
//! missed with the grace-expired reason.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, NaiveDateTime};
use medminder_domain::constants::GRACE_EXPIRED_REASON;
use medminder_domain::{
    DoseInstance, DoseState, IntakeLogEntry, MedMinderError, Medication, Result, UserId,
};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::timers::{TimerHandle, TimerKind};
use crate::intake::IntakeService;
use crate::reminders::ports::RescanTrigger;
use crate::schedule::doses_on;

/// A pending snooze, returned to the caller.
#[derive(Debug, Clone)]
pub struct SnoozeTimer {
    pub dose: DoseInstance,
    /// Snooze count after this snooze.
    pub snooze_count: u32,
    /// The dose will not be offered again by the scanner.
    pub cap_reached: bool,
    pub fires_at: NaiveDateTime,
    pub handle: TimerHandle,
}

/// Result of checking a dose against its grace period
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum GraceOutcome {
    /// Still inside the grace window.
    Pending { remaining_minutes: i64 },
    /// An entry already exists; nothing was written.
    AlreadyResolved { state: DoseState },
    /// The dose was marked missed.
    MarkedMissed { entry: IntakeLogEntry },
}

/// Coordinates snooze timers and grace-period expiry for dose instances
pub struct SnoozeCoordinator {
    intake: Arc<IntakeService>,
    rescan: Arc<dyn RescanTrigger>,
    grace_period_minutes: u32,
}

impl SnoozeCoordinator {
    pub fn new(
        intake: Arc<IntakeService>,
        rescan: Arc<dyn RescanTrigger>,
        grace_period_minutes: u32,
    ) -> Self {
        Self { intake, rescan, grace_period_minutes }
    }

    /// Snooze a due dose for `minutes`.
    ///
    /// The counter saturates at the configured maximum; once reached the
    /// scanner stops offering the dose and only grace expiry resolves it.
    ///
    /// # Errors
    /// - `InvalidInput` for a zero interval
    /// - `Conflict` when the dose is already resolved
    #[instrument(skip_all, fields(user = %user_id, dose = %dose, minutes = minutes))]
    pub async fn snooze(
        &self,
        user_id: &UserId,
        dose: &DoseInstance,
        minutes: u32,
    ) -> Result<SnoozeTimer> {
        if minutes == 0 {
            return Err(MedMinderError::InvalidInput("snooze interval must be positive".into()));
        }
        let state = self.intake.state_of(user_id, dose).await?;
        if state.is_resolved() {
            return Err(MedMinderError::Conflict(format!("dose {dose} is already {state}")));
        }

        let ledger = self.intake.ledger();
        let snooze_count = ledger.record_snooze(user_id, dose).await?;
        let cap_reached = ledger.is_snooze_exhausted(snooze_count);

        let timers = Arc::clone(self.intake.timers());
        let armed = timers
            .arm(user_id, dose, TimerKind::Snooze, true)
            .ok_or_else(|| MedMinderError::Internal("snooze timer slot unavailable".into()))?;
        let handle = armed.handle();
        let delay = StdDuration::from_secs(u64::from(minutes) * 60);
        let rescan = Arc::clone(&self.rescan);
        let (user, dose_key) = (user_id.clone(), dose.clone());
        tokio::spawn(async move {
            tokio::select! {
                () = armed.token.cancelled() => {
                    debug!(dose = %dose_key, "Snooze timer cancelled");
                }
                () = tokio::time::sleep(delay) => {
                    timers.release(&user, &dose_key, TimerKind::Snooze, armed.generation);
                    debug!(dose = %dose_key, "Snooze elapsed; requesting rescan");
                    rescan.request_rescan(&user);
                }
            }
        });

        self.schedule_grace_expiry(user_id, dose);

        let fires_at = self.intake.clock().now() + Duration::minutes(i64::from(minutes));
        info!(snooze_count, cap_reached, %fires_at, "Dose snoozed");
        Ok(SnoozeTimer { dose: dose.clone(), snooze_count, cap_reached, fires_at, handle })
    }

    /// Mark the dose missed if its grace period has elapsed and it is still
    /// unresolved. Idempotent: an existing entry is never overwritten.
    #[instrument(skip_all, fields(user = %user_id, dose = %dose))]
    pub async fn check_grace_expiry(
        &self,
        user_id: &UserId,
        dose: &DoseInstance,
    ) -> Result<GraceOutcome> {
        let now = self.intake.clock().now();
        let deadline = self.deadline(dose);
        if now <= deadline {
            return Ok(GraceOutcome::Pending { remaining_minutes: (deadline - now).num_minutes() });
        }
        expire_unresolved(&self.intake, user_id, dose).await
    }

    /// Arm a timer that expires the dose once its grace period ends.
    ///
    /// Returns `None` when a grace timer for the dose is already pending.
    pub fn schedule_grace_expiry(&self, user_id: &UserId, dose: &DoseInstance) -> Option<TimerHandle> {
        let timers = Arc::clone(self.intake.timers());
        let armed = timers.arm(user_id, dose, TimerKind::GraceExpiry, false)?;
        let handle = armed.handle();

        // first whole minute past the deadline, matching the scanner's window
        let fire_at = self.deadline(dose) + Duration::minutes(1);
        let delay = (fire_at - self.intake.clock().now()).to_std().unwrap_or_default();
        let intake = Arc::clone(&self.intake);
        let (user, dose) = (user_id.clone(), dose.clone());
        tokio::spawn(async move {
            tokio::select! {
                () = armed.token.cancelled() => {
                    debug!(dose = %dose, "Grace timer cancelled");
                }
                () = tokio::time::sleep(delay) => {
                    timers.release(&user, &dose, TimerKind::GraceExpiry, armed.generation);
                    match expire_unresolved(&intake, &user, &dose).await {
                        Ok(outcome) => debug!(dose = %dose, ?outcome, "Grace timer fired"),
                        Err(err) => warn!(dose = %dose, error = %err, "Grace expiry failed"),
                    }
                }
            }
        });
        Some(handle)
    }

    /// Mark every expired, unresolved dose of today missed.
    ///
    /// Doses scheduled before the medication was added are ignored.
    /// Per-dose failures are logged and skipped.
    #[instrument(skip_all, fields(user = %user_id, medications = medications.len()))]
    pub async fn sweep_expired(
        &self,
        user_id: &UserId,
        medications: &[Medication],
        now: NaiveDateTime,
    ) -> Vec<IntakeLogEntry> {
        let mut marked = Vec::new();
        for medication in medications {
            for dose in doses_on(medication, now.date()) {
                if dose.scheduled_at() < medication.added_at || now <= self.deadline(&dose) {
                    continue;
                }
                match self.intake.is_resolved(user_id, medication, &dose).await {
                    Ok(true) => {}
                    Ok(false) => match self
                        .intake
                        .record_missed(user_id, &dose, Some(GRACE_EXPIRED_REASON.to_string()))
                        .await
                    {
                        Ok(entry) => marked.push(entry),
                        Err(err) => warn!(dose = %dose, error = %err, "Failed to mark expired dose"),
                    },
                    Err(err) => warn!(dose = %dose, error = %err, "Failed to resolve dose state"),
                }
            }
        }
        if !marked.is_empty() {
            info!(count = marked.len(), "Marked expired doses missed");
        }
        marked
    }

    pub fn grace_period_minutes(&self) -> u32 {
        self.grace_period_minutes
    }

    fn deadline(&self, dose: &DoseInstance) -> NaiveDateTime {
        dose.scheduled_at() + Duration::minutes(i64::from(self.grace_period_minutes))
    }
}

async fn expire_unresolved(
    intake: &IntakeService,
    user_id: &UserId,
    dose: &DoseInstance,
) -> Result<GraceOutcome> {
    let state = intake.state_of(user_id, dose).await?;
    if state.is_resolved() {
        return Ok(GraceOutcome::AlreadyResolved { state });
    }
    let entry = intake.record_missed(user_id, dose, Some(GRACE_EXPIRED_REASON.to_string())).await?;
    Ok(GraceOutcome::MarkedMissed { entry })
}
