//! Read-only views: adherence statistics, calendar marks and the day view.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use medminder_core::{compute_stats, daily_adherence, day_schedule, IntakeLogStore};
use medminder_domain::{AdherenceStats, DayAdherence, DoseView, MedMinderError};

use super::CommandError;
use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;
use crate::utils::parsing::{parse_date, parse_user};

fn parse_period(start: &str, end: &str) -> medminder_domain::Result<(NaiveDate, NaiveDate)> {
    let (start, end) = (parse_date(start)?, parse_date(end)?);
    if start > end {
        return Err(MedMinderError::InvalidInput(format!(
            "period start {start} is after end {end}"
        )));
    }
    Ok((start, end))
}

/// Adherence statistics for the inclusive period `start..=end`.
pub async fn adherence_stats(
    ctx: &AppContext,
    user_id: &str,
    start: &str,
    end: &str,
) -> Result<AdherenceStats, CommandError> {
    execute_command("reports::adherence_stats", async {
        let user_id = parse_user(user_id)?;
        let (start, end) = parse_period(start, end)?;
        let logs = ctx.intake_logs.list(&user_id).await?;
        let medications = ctx.medication_service.list(&user_id).await?;
        Ok(compute_stats(&logs, &medications, start, end))
    })
    .await
}

/// Per-day taken/total counts for calendar marking.
pub async fn calendar_marks(
    ctx: &AppContext,
    user_id: &str,
    start: &str,
    end: &str,
) -> Result<BTreeMap<NaiveDate, DayAdherence>, CommandError> {
    execute_command("reports::calendar_marks", async {
        let user_id = parse_user(user_id)?;
        let (start, end) = parse_period(start, end)?;
        let logs = ctx.intake_logs.list(&user_id).await?;
        Ok(daily_adherence(&logs, start, end))
    })
    .await
}

/// Every dose of `date` with its current state.
pub async fn day_view(
    ctx: &AppContext,
    user_id: &str,
    date: &str,
) -> Result<Vec<DoseView>, CommandError> {
    execute_command("reports::day_view", async {
        let user_id = parse_user(user_id)?;
        let date = parse_date(date)?;
        let logs = ctx.intake_logs.list(&user_id).await?;
        let medications = ctx.medication_service.list(&user_id).await?;
        Ok(day_schedule(&medications, &logs, date))
    })
    .await
}
