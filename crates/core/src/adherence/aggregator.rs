//! Adherence aggregator
//!
//! Period totals and per-medication counts only look at entries whose date
//! falls in the period. Streaks always look at the whole history, ordered
//! newest first.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use medminder_domain::{
    percentage, AdherenceStats, DayAdherence, IntakeLogEntry, IntakeStatus, Medication,
    MedicationAdherence, MedicationId,
};

/// Adherence statistics for the inclusive period `start..=end`.
///
/// `medications` only supplies display names; entries of deleted
/// medications are still counted.
pub fn compute_stats(
    logs: &[IntakeLogEntry],
    medications: &[Medication],
    start: NaiveDate,
    end: NaiveDate,
) -> AdherenceStats {
    let names: HashMap<&MedicationId, &str> =
        medications.iter().map(|medication| (&medication.id, medication.name.as_str())).collect();

    let mut stats = AdherenceStats::default();
    for entry in logs.iter().filter(|entry| (start..=end).contains(&entry.date)) {
        stats.total_doses += 1;
        let taken = entry.status == IntakeStatus::Taken;
        match entry.status {
            IntakeStatus::Taken => stats.taken_doses += 1,
            IntakeStatus::Missed => stats.missed_doses += 1,
            IntakeStatus::Skipped => stats.skipped_doses += 1,
        }

        let group = stats.per_medication.entry(entry.medication_id.clone()).or_insert_with(|| {
            MedicationAdherence {
                medication_id: entry.medication_id.clone(),
                name: names.get(&entry.medication_id).map(|name| (*name).to_string()),
                taken: 0,
                total: 0,
            }
        });
        group.total += 1;
        if taken {
            group.taken += 1;
        }
    }
    stats.adherence_rate = percentage(stats.taken_doses, stats.total_doses);

    let (current, longest) = streaks(logs);
    stats.current_streak = current;
    stats.longest_streak = longest;

    // ties go to the smaller medication id in both directions
    let most = stats
        .per_medication
        .values()
        .max_by(|a, b| a.taken.cmp(&b.taken).then_with(|| b.medication_id.cmp(&a.medication_id)))
        .cloned();
    stats.needs_attention = most.as_ref().and_then(|most| {
        stats
            .per_medication
            .values()
            .filter(|group| group.medication_id != most.medication_id)
            .min_by(|a, b| a.taken.cmp(&b.taken).then_with(|| a.medication_id.cmp(&b.medication_id)))
            .cloned()
    });
    stats.most_consistent = most;
    stats
}

/// `(current, longest)` streaks of consecutive taken entries over the whole
/// history.
///
/// Entries are ordered newest first by date, then by creation time. The
/// current streak counts taken entries before the first non-taken one.
pub fn streaks(logs: &[IntakeLogEntry]) -> (u32, u32) {
    let mut ordered: Vec<&IntakeLogEntry> = logs.iter().collect();
    ordered.sort_by(|a, b| newest_first(a, b));

    let mut current: Option<u32> = None;
    let mut longest = 0;
    let mut run = 0;
    for entry in ordered {
        if entry.status == IntakeStatus::Taken {
            run += 1;
            longest = longest.max(run);
        } else {
            current.get_or_insert(run);
            run = 0;
        }
    }
    (current.unwrap_or(run), longest)
}

/// Taken/total counts per calendar day in `start..=end`.
///
/// Days without entries are absent.
pub fn daily_adherence(
    logs: &[IntakeLogEntry],
    start: NaiveDate,
    end: NaiveDate,
) -> BTreeMap<NaiveDate, DayAdherence> {
    let mut days: BTreeMap<NaiveDate, DayAdherence> = BTreeMap::new();
    for entry in logs.iter().filter(|entry| (start..=end).contains(&entry.date)) {
        let day = days
            .entry(entry.date)
            .or_insert(DayAdherence { date: entry.date, taken: 0, total: 0 });
        day.total += 1;
        if entry.status == IntakeStatus::Taken {
            day.taken += 1;
        }
    }
    days
}

fn newest_first(a: &IntakeLogEntry, b: &IntakeLogEntry) -> Ordering {
    b.date.cmp(&a.date).then_with(|| b.created_at.cmp(&a.created_at))
}
