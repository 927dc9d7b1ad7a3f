//! Medication records, drafts and partial updates

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use num_rational::Rational64;
use num_traits::{CheckedAdd, CheckedSub, Signed, Zero};
use serde::{Deserialize, Serialize};

use crate::constants::MAX_AMOUNT_DENOMINATOR;
use crate::types::schedule::{ClockTime, DayPattern};
use crate::{impl_domain_enum_conversions, opaque_id, MedMinderError, Result};

opaque_id!(
    /// Opaque medication identifier issued by the medication store.
    MedicationId
);

opaque_id!(
    /// Account that owns medications and intake history.
    UserId
);

/// Physical form of a medication
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MedicationForm {
    #[default]
    Pill,
    Capsule,
    Liquid,
    Injection,
    Cream,
    Inhaler,
}

impl_domain_enum_conversions!(MedicationForm {
    Pill => "pill",
    Capsule => "capsule",
    Liquid => "liquid",
    Injection => "injection",
    Cream => "cream",
    Inhaler => "inhaler",
});

/// How the scheduled times of a medication were chosen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScheduleType {
    #[default]
    FixedTimes,
    Interval,
    AsNeeded,
    WithMeals,
    Bedtime,
}

impl_domain_enum_conversions!(ScheduleType {
    FixedTimes => "fixed-times",
    Interval => "interval",
    AsNeeded => "as-needed",
    WithMeals => "with-meals",
    Bedtime => "bedtime",
});

/// A medication registered by a user.
///
/// # Field Invariants
/// - `times` is sorted and free of duplicates
/// - `current_servings` is never negative
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    pub id: MedicationId,
    pub user_id: UserId,
    pub name: String,
    pub dosage: String,
    pub dosage_unit: String,
    #[serde(default)]
    pub form: MedicationForm,
    #[serde(default)]
    pub schedule_type: ScheduleType,
    #[serde(default)]
    pub times: Vec<ClockTime>,
    #[serde(default)]
    pub day_pattern: DayPattern,
    /// Servings consumed by one dose.
    pub serving_size: Rational64,
    pub servings_per_container: u32,
    pub current_servings: Rational64,
    pub refill_threshold: u32,
    /// Device-local instant the medication was added; no dose before it is due.
    pub added_at: NaiveDateTime,
    pub created_at: DateTime<Utc>,
}

impl Medication {
    /// With several daily times, intake entries must match the exact time.
    pub fn has_multiple_daily_times(&self) -> bool {
        self.times.len() > 1
    }

    pub fn start_date(&self) -> NaiveDate {
        self.added_at.date()
    }

    pub fn needs_refill(&self) -> bool {
        self.current_servings <= Rational64::from_integer(i64::from(self.refill_threshold))
    }

    /// Deduct `amount` servings, clamping at zero. Returns what was removed.
    ///
    /// # Errors
    /// Returns `MedMinderError::InvalidInput` when the result is not
    /// representable; inventory is left unchanged.
    pub fn deduct_servings(&mut self, amount: Rational64) -> Result<Rational64> {
        let removed = amount.min(self.current_servings).max(Rational64::zero());
        self.current_servings = self
            .current_servings
            .checked_sub(&removed)
            .ok_or_else(|| inventory_overflow(&self.name))?;
        Ok(removed)
    }

    /// # Errors
    /// Returns `MedMinderError::InvalidInput` when the result is not
    /// representable; inventory is left unchanged.
    pub fn restore_servings(&mut self, amount: Rational64) -> Result<()> {
        self.current_servings = self
            .current_servings
            .checked_add(&amount.max(Rational64::zero()))
            .ok_or_else(|| inventory_overflow(&self.name))?;
        Ok(())
    }
}

/// User-supplied data for a new medication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationDraft {
    pub name: String,
    pub dosage: String,
    pub dosage_unit: String,
    #[serde(default)]
    pub form: MedicationForm,
    #[serde(default)]
    pub schedule_type: ScheduleType,
    #[serde(default)]
    pub times: Vec<ClockTime>,
    #[serde(default)]
    pub day_pattern: DayPattern,
    pub serving_size: Rational64,
    pub servings_per_container: u32,
    /// Defaults to a full container.
    #[serde(default)]
    pub current_servings: Option<Rational64>,
    #[serde(default)]
    pub refill_threshold: u32,
}

impl MedicationDraft {
    /// Validate the draft and normalise it for `today`.
    ///
    /// Sorts times, and pins an unset every-other-day anchor to `today` so
    /// the schedule does not depend on when it is first evaluated.
    ///
    /// # Errors
    /// Returns `MedMinderError::InvalidInput` for an empty name, a
    /// non-positive serving size, duplicate times, a negative inventory or a
    /// timed schedule without times.
    pub fn validate(&mut self, today: NaiveDate) -> Result<()> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(MedMinderError::InvalidInput("medication name is required".into()));
        }
        if !self.serving_size.is_positive() {
            return Err(MedMinderError::InvalidInput("serving size must be positive".into()));
        }
        check_amount(self.serving_size, "serving size")?;
        if let Some(servings) = self.current_servings {
            if servings.is_negative() {
                return Err(MedMinderError::InvalidInput(
                    "current servings cannot be negative".into(),
                ));
            }
            check_amount(servings, "current servings")?;
        }
        normalise_times(&mut self.times)?;
        if self.times.is_empty() && self.schedule_type != ScheduleType::AsNeeded {
            return Err(MedMinderError::InvalidInput(format!(
                "schedule type {} requires at least one time",
                self.schedule_type
            )));
        }
        if let DayPattern::EveryOtherDay { anchor } = &mut self.day_pattern {
            anchor.get_or_insert(today);
        }
        Ok(())
    }

    pub fn into_medication(
        self,
        id: MedicationId,
        user_id: UserId,
        added_at: NaiveDateTime,
        created_at: DateTime<Utc>,
    ) -> Medication {
        let current_servings = self.current_servings.unwrap_or_else(|| {
            Rational64::from_integer(i64::from(self.servings_per_container))
        });
        Medication {
            id,
            user_id,
            name: self.name,
            dosage: self.dosage,
            dosage_unit: self.dosage_unit,
            form: self.form,
            schedule_type: self.schedule_type,
            times: self.times,
            day_pattern: self.day_pattern,
            serving_size: self.serving_size,
            servings_per_container: self.servings_per_container,
            current_servings,
            refill_threshold: self.refill_threshold,
            added_at,
            created_at,
        }
    }
}

/// Partial update of a medication; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dosage_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form: Option<MedicationForm>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_type: Option<ScheduleType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub times: Option<Vec<ClockTime>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_pattern: Option<DayPattern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serving_size: Option<Rational64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings_per_container: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_servings: Option<Rational64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refill_threshold: Option<u32>,
}

impl MedicationPatch {
    /// Inventory-only update.
    pub fn servings(current_servings: Rational64) -> Self {
        Self { current_servings: Some(current_servings), ..Self::default() }
    }

    /// True when applying this patch can change which doses are due.
    pub fn changes_schedule(&self) -> bool {
        self.times.is_some() || self.day_pattern.is_some() || self.schedule_type.is_some()
    }

    /// Validate the fields being changed.
    ///
    /// # Errors
    /// Returns `MedMinderError::InvalidInput` for the same conditions as
    /// [`MedicationDraft::validate`].
    pub fn validate(&mut self) -> Result<()> {
        if let Some(name) = &mut self.name {
            *name = name.trim().to_string();
            if name.is_empty() {
                return Err(MedMinderError::InvalidInput("medication name is required".into()));
            }
        }
        if let Some(size) = self.serving_size {
            if !size.is_positive() {
                return Err(MedMinderError::InvalidInput("serving size must be positive".into()));
            }
            check_amount(size, "serving size")?;
        }
        if let Some(servings) = self.current_servings {
            if servings.is_negative() {
                return Err(MedMinderError::InvalidInput(
                    "current servings cannot be negative".into(),
                ));
            }
            check_amount(servings, "current servings")?;
        }
        if let Some(times) = &mut self.times {
            normalise_times(times)?;
        }
        Ok(())
    }

    pub fn apply(&self, medication: &mut Medication) {
        if let Some(name) = &self.name {
            medication.name.clone_from(name);
        }
        if let Some(dosage) = &self.dosage {
            medication.dosage.clone_from(dosage);
        }
        if let Some(unit) = &self.dosage_unit {
            medication.dosage_unit.clone_from(unit);
        }
        if let Some(form) = self.form {
            medication.form = form;
        }
        if let Some(schedule_type) = self.schedule_type {
            medication.schedule_type = schedule_type;
        }
        if let Some(times) = &self.times {
            medication.times.clone_from(times);
        }
        if let Some(pattern) = &self.day_pattern {
            medication.day_pattern = pattern.clone();
        }
        if let Some(size) = self.serving_size {
            medication.serving_size = size;
        }
        if let Some(per_container) = self.servings_per_container {
            medication.servings_per_container = per_container;
        }
        if let Some(servings) = self.current_servings {
            medication.current_servings = servings.max(Rational64::zero());
        }
        if let Some(threshold) = self.refill_threshold {
            medication.refill_threshold = threshold;
        }
    }
}

/// Reject fractions finer than [`MAX_AMOUNT_DENOMINATOR`].
///
/// # Errors
/// Returns `MedMinderError::InvalidInput` naming `what`.
pub fn check_amount(amount: Rational64, what: &str) -> Result<()> {
    if *amount.denom() > MAX_AMOUNT_DENOMINATOR {
        return Err(MedMinderError::InvalidInput(format!(
            "{what} {amount} is finer than 1/{MAX_AMOUNT_DENOMINATOR}"
        )));
    }
    Ok(())
}

fn inventory_overflow(name: &str) -> MedMinderError {
    MedMinderError::InvalidInput(format!("inventory of {name} is out of range"))
}

fn normalise_times(times: &mut Vec<ClockTime>) -> Result<()> {
    times.sort_unstable();
    let before = times.len();
    times.dedup();
    if times.len() != before {
        return Err(MedMinderError::InvalidInput("scheduled times must be distinct".into()));
    }
    Ok(())
}
