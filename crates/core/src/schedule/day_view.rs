//! Day view: every dose instance of a date with its derived state

use std::collections::HashMap;

use chrono::NaiveDate;
use medminder_domain::{
    DoseInstance, DoseState, DoseView, IntakeLogEntry, Medication, MedicationId,
};

use super::day_pattern::doses_on;

/// Build the dose list for `date`, ordered by time then medication name.
///
/// Only medications added on or before `date` are listed. Each dose takes
/// the state of its most recent matching intake entry, or `Scheduled`.
pub fn day_schedule(
    medications: &[Medication],
    logs: &[IntakeLogEntry],
    date: NaiveDate,
) -> Vec<DoseView> {
    let mut by_medication: HashMap<&MedicationId, Vec<&IntakeLogEntry>> = HashMap::new();
    for entry in logs.iter().filter(|entry| entry.date == date) {
        by_medication.entry(&entry.medication_id).or_default().push(entry);
    }

    let mut views: Vec<DoseView> = medications
        .iter()
        .filter(|medication| medication.start_date() <= date)
        .flat_map(|medication| {
            let entries = by_medication.get(&medication.id).map(Vec::as_slice).unwrap_or_default();
            doses_on(medication, date)
                .into_iter()
                .map(move |dose| dose_view(medication, entries, dose))
        })
        .collect();

    views.sort_by(|a, b| {
        a.dose
            .scheduled_time
            .cmp(&b.dose.scheduled_time)
            .then_with(|| a.medication_name.cmp(&b.medication_name))
    });
    views
}

fn dose_view(medication: &Medication, entries: &[&IntakeLogEntry], dose: DoseInstance) -> DoseView {
    let exact = medication.has_multiple_daily_times();
    let entry = entries
        .iter()
        .filter(|entry| entry.matches(&dose, exact))
        .max_by_key(|entry| entry.created_at);

    DoseView {
        medication_name: medication.name.clone(),
        serving_size: medication.serving_size,
        state: entry.map_or(DoseState::Scheduled, |entry| entry.status.into()),
        actual_time: entry.and_then(|entry| entry.actual_time),
        reason: entry.and_then(|entry| entry.reason.clone()),
        dose,
    }
}
