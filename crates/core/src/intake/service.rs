//! Intake service - dose state machine
//!
//! A dose is `Scheduled` until an intake entry resolves it. Changing the
//! outcome of a resolved dose goes through `revert` first, which deletes the
//! entry and gives back any inventory it consumed.

use std::sync::Arc;

use medminder_domain::constants::DEFAULT_MISSED_REASON;
use medminder_domain::{
    check_amount, ClockTime, DoseInstance, DoseState, IntakeLogEntry, IntakeStatus, MedMinderError, Medication,
    MedicationPatch, Result, SkipReason, UserId,
};
use num_rational::Rational64;
use num_traits::{Signed, Zero};
use tracing::{debug, error, info, instrument, warn};

use super::ports::IntakeLogStore;
use crate::clock_ports::Clock;
use crate::medication::ports::MedicationStore;
use crate::reminders::ledger::DoseLedger;
use crate::snooze::timers::TimerRegistry;

/// Records dose outcomes against the intake log and keeps inventory in step
pub struct IntakeService {
    medications: Arc<dyn MedicationStore>,
    logs: Arc<dyn IntakeLogStore>,
    ledger: Arc<DoseLedger>,
    clock: Arc<dyn Clock>,
    timers: Arc<TimerRegistry>,
}

impl IntakeService {
    pub fn new(
        medications: Arc<dyn MedicationStore>,
        logs: Arc<dyn IntakeLogStore>,
        ledger: Arc<DoseLedger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { medications, logs, ledger, clock, timers: Arc::new(TimerRegistry::new()) }
    }

    /// Share a timer registry so resolving a dose cancels its snooze and
    /// grace timers.
    pub fn with_timers(mut self, timers: Arc<TimerRegistry>) -> Self {
        self.timers = timers;
        self
    }

    pub fn timers(&self) -> &Arc<TimerRegistry> {
        &self.timers
    }

    pub fn ledger(&self) -> &Arc<DoseLedger> {
        &self.ledger
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Mark a dose taken and deduct `dose_amount` servings from inventory.
    ///
    /// Inventory is clamped at zero; the amount actually removed is stored
    /// on the entry so a revert restores exactly that.
    ///
    /// # Errors
    /// - `InvalidInput` when `dose_amount` is not positive, is finer than
    ///   a thousandth, or leaves inventory unrepresentable
    /// - `NotFound` when the medication does not exist
    /// - store errors; if the inventory update fails, the appended entry is
    ///   deleted again before the error is returned
    #[instrument(skip_all, fields(user = %user_id, dose = %dose))]
    pub async fn record_taken(
        &self,
        user_id: &UserId,
        dose: &DoseInstance,
        actual_time: ClockTime,
        dose_amount: Rational64,
    ) -> Result<IntakeLogEntry> {
        if !dose_amount.is_positive() {
            return Err(MedMinderError::InvalidInput("dose amount must be positive".into()));
        }
        check_amount(dose_amount, "dose amount")?;
        let mut medication = self.require_medication(user_id, dose).await?;
        let deducted = medication.deduct_servings(dose_amount)?;
        if deducted < dose_amount {
            warn!(
                medication = %medication.id,
                requested = %dose_amount,
                deducted = %deducted,
                "Inventory exhausted; deduction clamped at zero"
            );
        }

        let entry = IntakeLogEntry::taken(
            user_id.clone(),
            dose,
            actual_time,
            dose_amount,
            deducted,
            self.clock.timestamp(),
        );
        let entry = self.append(user_id, entry).await?;

        let patch = MedicationPatch::servings(medication.current_servings);
        if let Err(err) = self.medications.update(&medication.id, &patch).await {
            error!(error = %err, entry = %entry.id, "Inventory update failed; removing intake entry");
            if let Err(rollback) = self.logs.delete(&entry.id).await {
                error!(error = %rollback, entry = %entry.id, "Failed to remove intake entry after inventory failure");
            }
            return Err(err);
        }

        self.after_resolve(user_id, dose, IntakeStatus::Taken).await;
        info!(remaining = %medication.current_servings, "Dose taken");
        Ok(entry)
    }

    /// Mark a dose missed. A blank reason becomes the default reason.
    #[instrument(skip_all, fields(user = %user_id, dose = %dose))]
    pub async fn record_missed(
        &self,
        user_id: &UserId,
        dose: &DoseInstance,
        reason: Option<String>,
    ) -> Result<IntakeLogEntry> {
        let reason = reason
            .map(|reason| reason.trim().to_string())
            .filter(|reason| !reason.is_empty())
            .unwrap_or_else(|| DEFAULT_MISSED_REASON.to_string());
        let entry = IntakeLogEntry::missed(user_id.clone(), dose, reason, self.clock.timestamp());
        let entry = self.append(user_id, entry).await?;
        self.after_resolve(user_id, dose, IntakeStatus::Missed).await;
        info!(reason = entry.reason.as_deref().unwrap_or_default(), "Dose missed");
        Ok(entry)
    }

    /// Mark a dose skipped. Inventory is untouched.
    #[instrument(skip_all, fields(user = %user_id, dose = %dose))]
    pub async fn record_skipped(
        &self,
        user_id: &UserId,
        dose: &DoseInstance,
        reason: Option<SkipReason>,
    ) -> Result<IntakeLogEntry> {
        let entry =
            IntakeLogEntry::skipped(user_id.clone(), dose, reason.as_ref(), self.clock.timestamp());
        let entry = self.append(user_id, entry).await?;
        self.after_resolve(user_id, dose, IntakeStatus::Skipped).await;
        info!(reason = entry.reason.as_deref().unwrap_or_default(), "Dose skipped");
        Ok(entry)
    }

    /// Return a resolved dose to `Scheduled`.
    ///
    /// Deletes the most recently created matching entry and restores the
    /// servings a taken entry deducted. Returns `None` when nothing matched.
    #[instrument(skip_all, fields(user = %user_id, dose = %dose))]
    pub async fn revert(
        &self,
        user_id: &UserId,
        dose: &DoseInstance,
    ) -> Result<Option<IntakeLogEntry>> {
        let medication = self.medications.get(user_id, &dose.medication_id).await?;
        let Some(entry) = self.find_entry(user_id, medication.as_ref(), dose).await? else {
            debug!("No intake entry to revert");
            self.forget_resolution(user_id, dose).await;
            return Ok(None);
        };

        let mut restocked = None;
        if let Some(mut medication) = medication {
            let restored = entry.restorable_servings();
            if !restored.is_zero() {
                medication.restore_servings(restored)?;
                restocked = Some(medication);
            }
        }

        self.logs.delete(&entry.id).await?;

        if let Some(medication) = restocked {
            let patch = MedicationPatch::servings(medication.current_servings);
            if let Err(err) = self.medications.update(&medication.id, &patch).await {
                error!(error = %err, "Inventory restore failed; re-appending intake entry");
                if let Err(rollback) = self.logs.append(user_id, entry.clone()).await {
                    error!(error = %rollback, "Failed to re-append intake entry after inventory failure");
                }
                return Err(err);
            }
        }

        self.forget_resolution(user_id, dose).await;
        info!(entry = %entry.id, status = %entry.status, "Dose reverted to scheduled");
        Ok(Some(entry))
    }

    /// Most recently created entry resolving `dose`.
    ///
    /// Without a medication (deleted since) the scheduled time must match
    /// exactly.
    pub async fn find_entry(
        &self,
        user_id: &UserId,
        medication: Option<&Medication>,
        dose: &DoseInstance,
    ) -> Result<Option<IntakeLogEntry>> {
        let exact = medication.map_or(true, Medication::has_multiple_daily_times);
        let entries = self.logs.list(user_id).await?;
        Ok(entries
            .into_iter()
            .filter(|entry| entry.matches(dose, exact))
            .max_by_key(|entry| entry.created_at))
    }

    pub async fn state_of(&self, user_id: &UserId, dose: &DoseInstance) -> Result<DoseState> {
        let medication = self.medications.get(user_id, &dose.medication_id).await?;
        let entry = self.find_entry(user_id, medication.as_ref(), dose).await?;
        Ok(entry.map_or(DoseState::Scheduled, |entry| entry.status.into()))
    }

    /// Whether the dose already has an intake entry.
    ///
    /// Checks the cache ledger first and falls back to the intake log,
    /// warming the cache on a hit.
    pub async fn is_resolved(
        &self,
        user_id: &UserId,
        medication: &Medication,
        dose: &DoseInstance,
    ) -> Result<bool> {
        match self.ledger.resolved_status(user_id, dose).await {
            Ok(Some(_)) => return Ok(true),
            Ok(None) => {}
            Err(err) => warn!(error = %err, dose = %dose, "Ledger read failed; using intake log"),
        }

        let Some(entry) = self.find_entry(user_id, Some(medication), dose).await? else {
            return Ok(false);
        };
        if let Err(err) = self.ledger.mark_resolved(user_id, dose, entry.status).await {
            warn!(error = %err, dose = %dose, "Failed to warm resolution cache");
        }
        Ok(true)
    }

    pub async fn history(&self, user_id: &UserId) -> Result<Vec<IntakeLogEntry>> {
        self.logs.list(user_id).await
    }

    async fn require_medication(&self, user_id: &UserId, dose: &DoseInstance) -> Result<Medication> {
        self.medications
            .get(user_id, &dose.medication_id)
            .await?
            .ok_or_else(|| MedMinderError::NotFound(format!("medication {}", dose.medication_id)))
    }

    async fn append(&self, user_id: &UserId, mut entry: IntakeLogEntry) -> Result<IntakeLogEntry> {
        entry.id = self.logs.append(user_id, entry.clone()).await?;
        Ok(entry)
    }

    /// Cache bookkeeping after a persisted resolution. The entry is already
    /// durable, so failures here are logged, not returned.
    async fn after_resolve(&self, user_id: &UserId, dose: &DoseInstance, status: IntakeStatus) {
        self.timers.cancel_dose(user_id, dose);
        if let Err(err) = self.ledger.mark_resolved(user_id, dose, status).await {
            warn!(error = %err, dose = %dose, "Failed to cache dose resolution");
        }
        if status == IntakeStatus::Taken {
            if let Err(err) = self.ledger.reset_snoozes(user_id, dose).await {
                warn!(error = %err, dose = %dose, "Failed to reset snooze counter");
            }
        }
    }

    async fn forget_resolution(&self, user_id: &UserId, dose: &DoseInstance) {
        if let Err(err) = self.ledger.clear_resolved(user_id, dose).await {
            warn!(error = %err, dose = %dose, "Failed to clear cached resolution");
        }
    }
}
