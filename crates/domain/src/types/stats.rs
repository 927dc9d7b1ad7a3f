//! Adherence statistics types
//!
//! All statistics are derived on demand from the intake log and are never
//! persisted:
//! - Period totals, rate and streaks
//! - Per-medication taken/total breakdown
//! - Per-day adherence for calendar marking

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::medication::MedicationId;

/* -------------------------------------------------------------------------- */
/* Period Statistics */
/* -------------------------------------------------------------------------- */

/// Adherence statistics for a period.
///
/// # Field Invariants
/// - `taken_doses + missed_doses + skipped_doses == total_doses`
/// - `adherence_rate` is a rounded percentage in `0..=100`
/// - `current_streak <= longest_streak`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdherenceStats {
    pub total_doses: u32,
    pub taken_doses: u32,
    pub missed_doses: u32,
    pub skipped_doses: u32,
    pub adherence_rate: u32,
    /// Taken entries since the most recent non-taken entry (whole history).
    pub current_streak: u32,
    /// Longest run of consecutive taken entries (whole history).
    pub longest_streak: u32,
    pub per_medication: BTreeMap<MedicationId, MedicationAdherence>,
    /// Medication with the most taken doses in the period.
    pub most_consistent: Option<MedicationAdherence>,
    /// Medication with the fewest taken doses, distinct from `most_consistent`.
    pub needs_attention: Option<MedicationAdherence>,
}

/* -------------------------------------------------------------------------- */
/* Per-medication Breakdown */
/* -------------------------------------------------------------------------- */

/// Taken/total counts for one medication within a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationAdherence {
    pub medication_id: MedicationId,
    /// `None` when the medication has since been deleted.
    pub name: Option<String>,
    pub taken: u32,
    pub total: u32,
}

impl MedicationAdherence {
    pub fn rate(&self) -> u32 {
        percentage(self.taken, self.total)
    }
}

/* -------------------------------------------------------------------------- */
/* Daily Adherence */
/* -------------------------------------------------------------------------- */

/// Taken/total counts for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAdherence {
    pub date: NaiveDate,
    pub taken: u32,
    pub total: u32,
}

impl DayAdherence {
    pub fn rate(&self) -> u32 {
        percentage(self.taken, self.total)
    }
}

/// Rounded `100 * part / whole`, or 0 for an empty whole.
pub fn percentage(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    let scaled = u64::from(part) * 100;
    let whole = u64::from(whole);
    // round half up
    u32::try_from((scaled * 2 + whole) / (whole * 2)).unwrap_or(100)
}
