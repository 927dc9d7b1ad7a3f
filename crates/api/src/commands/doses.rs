//! Dose commands: take, skip, miss, revert, snooze and grace checks.

use chrono::NaiveDateTime;
use medminder_core::{GraceOutcome, MedicationStore};
use medminder_domain::{ClockTime, IntakeLogEntry, MedMinderError, SkipReason};
use serde::Serialize;

use super::CommandError;
use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;
use crate::utils::parsing::{parse_amount, parse_dose, parse_time, parse_user};

/// Identifies one dose instance in raw boundary form.
#[derive(Debug, Clone, Copy)]
pub struct DoseRef<'a> {
    pub user_id: &'a str,
    pub medication_id: &'a str,
    /// `YYYY-MM-DD`
    pub date: &'a str,
    /// `HH:MM`
    pub time: &'a str,
}

/// Mark a dose taken.
///
/// `actual_time` defaults to the current time and `amount` to the
/// medication's serving size.
pub async fn take_dose(
    ctx: &AppContext,
    dose: DoseRef<'_>,
    actual_time: Option<&str>,
    amount: Option<&str>,
) -> Result<IntakeLogEntry, CommandError> {
    execute_command("doses::take_dose", async {
        let user_id = parse_user(dose.user_id)?;
        let instance = parse_dose(dose.medication_id, dose.date, dose.time)?;
        let actual_time = match actual_time {
            Some(raw) => parse_time(raw)?,
            None => ClockTime::from_naive_time(ctx.clock.now().time()),
        };
        let amount = match amount {
            Some(raw) => parse_amount(raw)?,
            None => ctx
                .medications
                .get(&user_id, &instance.medication_id)
                .await?
                .map(|medication| medication.serving_size)
                .ok_or_else(|| {
                    MedMinderError::NotFound(format!("medication {}", instance.medication_id))
                })?,
        };
        ctx.intake.record_taken(&user_id, &instance, actual_time, amount).await
    })
    .await
}

/// Mark a dose skipped. A reason matching one of the suggestions is stored
/// as that suggestion; anything else is kept as free text.
pub async fn skip_dose(
    ctx: &AppContext,
    dose: DoseRef<'_>,
    reason: Option<&str>,
) -> Result<IntakeLogEntry, CommandError> {
    execute_command("doses::skip_dose", async {
        let user_id = parse_user(dose.user_id)?;
        let instance = parse_dose(dose.medication_id, dose.date, dose.time)?;
        let reason = reason.filter(|raw| !raw.trim().is_empty()).map(SkipReason::from_text);
        ctx.intake.record_skipped(&user_id, &instance, reason).await
    })
    .await
}

pub async fn miss_dose(
    ctx: &AppContext,
    dose: DoseRef<'_>,
    reason: Option<&str>,
) -> Result<IntakeLogEntry, CommandError> {
    execute_command("doses::miss_dose", async {
        let user_id = parse_user(dose.user_id)?;
        let instance = parse_dose(dose.medication_id, dose.date, dose.time)?;
        ctx.intake.record_missed(&user_id, &instance, reason.map(str::to_string)).await
    })
    .await
}

/// Undo the most recent action on a dose. `None` when nothing was recorded.
pub async fn revert_dose(
    ctx: &AppContext,
    dose: DoseRef<'_>,
) -> Result<Option<IntakeLogEntry>, CommandError> {
    execute_command("doses::revert_dose", async {
        let user_id = parse_user(dose.user_id)?;
        let instance = parse_dose(dose.medication_id, dose.date, dose.time)?;
        ctx.intake.revert(&user_id, &instance).await
    })
    .await
}

/// Snooze outcome returned to the front end
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnoozeResponse {
    pub snooze_count: u32,
    pub cap_reached: bool,
    pub fires_at: NaiveDateTime,
}

/// Snooze a due dose by one of the configured intervals.
pub async fn snooze_dose(
    ctx: &AppContext,
    dose: DoseRef<'_>,
    minutes: u32,
) -> Result<SnoozeResponse, CommandError> {
    execute_command("doses::snooze_dose", async {
        let options = &ctx.config.reminders.snooze_options_minutes;
        if !options.contains(&minutes) {
            return Err(MedMinderError::InvalidInput(format!(
                "snooze interval {minutes} is not one of {options:?}"
            )));
        }
        let user_id = parse_user(dose.user_id)?;
        let instance = parse_dose(dose.medication_id, dose.date, dose.time)?;
        let timer = ctx.snooze.snooze(&user_id, &instance, minutes).await?;
        Ok(SnoozeResponse {
            snooze_count: timer.snooze_count,
            cap_reached: timer.cap_reached,
            fires_at: timer.fires_at,
        })
    })
    .await
}

/// Mark the dose missed if its grace period has elapsed.
pub async fn check_grace(
    ctx: &AppContext,
    dose: DoseRef<'_>,
) -> Result<GraceOutcome, CommandError> {
    execute_command("doses::check_grace", async {
        let user_id = parse_user(dose.user_id)?;
        let instance = parse_dose(dose.medication_id, dose.date, dose.time)?;
        ctx.snooze.check_grace_expiry(&user_id, &instance).await
    })
    .await
}
