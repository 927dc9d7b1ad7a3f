//! Medication commands: add, update, delete, refill, list and name search.

use medminder_core::{search_medications as search_catalogue, MedicationSuggestion};
use medminder_domain::{Medication, MedicationDraft, MedicationPatch};

use super::CommandError;
use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;
use crate::utils::parsing::{parse_medication_id, parse_user};

/// Validate and store a new medication, scheduling its daily reminders.
pub async fn add_medication(
    ctx: &AppContext,
    user_id: &str,
    draft: MedicationDraft,
) -> Result<Medication, CommandError> {
    execute_command("medications::add_medication", async {
        let user_id = parse_user(user_id)?;
        ctx.medication_service.add(&user_id, draft).await
    })
    .await
}

pub async fn update_medication(
    ctx: &AppContext,
    user_id: &str,
    medication_id: &str,
    patch: MedicationPatch,
) -> Result<Medication, CommandError> {
    execute_command("medications::update_medication", async {
        let user_id = parse_user(user_id)?;
        let medication_id = parse_medication_id(medication_id)?;
        ctx.medication_service.update(&user_id, &medication_id, patch).await
    })
    .await
}

/// Delete a medication. Its intake history is kept.
pub async fn delete_medication(
    ctx: &AppContext,
    user_id: &str,
    medication_id: &str,
) -> Result<(), CommandError> {
    execute_command("medications::delete_medication", async {
        let user_id = parse_user(user_id)?;
        let medication_id = parse_medication_id(medication_id)?;
        ctx.medication_service.delete(&user_id, &medication_id).await
    })
    .await
}

/// Reset inventory to a full container.
pub async fn refill_medication(
    ctx: &AppContext,
    user_id: &str,
    medication_id: &str,
) -> Result<Medication, CommandError> {
    execute_command("medications::refill_medication", async {
        let user_id = parse_user(user_id)?;
        let medication_id = parse_medication_id(medication_id)?;
        ctx.medication_service.refill(&user_id, &medication_id).await
    })
    .await
}

pub async fn list_medications(
    ctx: &AppContext,
    user_id: &str,
) -> Result<Vec<Medication>, CommandError> {
    execute_command("medications::list_medications", async {
        let user_id = parse_user(user_id)?;
        ctx.medication_service.list(&user_id).await
    })
    .await
}

/// Medications at or below their refill threshold.
pub async fn low_inventory(
    ctx: &AppContext,
    user_id: &str,
) -> Result<Vec<Medication>, CommandError> {
    execute_command("medications::low_inventory", async {
        let user_id = parse_user(user_id)?;
        ctx.medication_service.low_inventory(&user_id).await
    })
    .await
}

/// Name suggestions for the add-medication form.
pub async fn search_medications(
    ctx: &AppContext,
    query: &str,
) -> Result<Vec<MedicationSuggestion>, CommandError> {
    execute_command("medications::search_medications", async {
        search_catalogue(ctx.lookup.as_ref(), query).await
    })
    .await
}
