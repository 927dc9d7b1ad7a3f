//! Intake log entries and dose states

use chrono::{DateTime, NaiveDate, Utc};
use num_rational::Rational64;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::types::medication::{MedicationId, UserId};
use crate::types::schedule::{ClockTime, DoseInstance};
use crate::{impl_domain_enum_conversions, opaque_id};

opaque_id!(
    /// Opaque intake log entry identifier.
    IntakeLogId
);

/// Recorded outcome of a dose instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntakeStatus {
    Taken,
    Missed,
    Skipped,
}

impl_domain_enum_conversions!(IntakeStatus {
    Taken => "taken",
    Missed => "missed",
    Skipped => "skipped",
});

/// Lifecycle state of a dose instance.
///
/// `Scheduled` is implicit: no intake entry exists for the dose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoseState {
    Scheduled,
    Taken,
    Missed,
    Skipped,
}

impl_domain_enum_conversions!(DoseState {
    Scheduled => "scheduled",
    Taken => "taken",
    Missed => "missed",
    Skipped => "skipped",
});

impl DoseState {
    pub fn is_resolved(self) -> bool {
        self != Self::Scheduled
    }
}

impl From<IntakeStatus> for DoseState {
    fn from(status: IntakeStatus) -> Self {
        match status {
            IntakeStatus::Taken => Self::Taken,
            IntakeStatus::Missed => Self::Missed,
            IntakeStatus::Skipped => Self::Skipped,
        }
    }
}

/// Why a dose was skipped: one of the offered suggestions or free text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    AlreadyTaken,
    FeelingUnwell,
    ForgotMedication,
    SideEffects,
    Other(String),
}

impl SkipReason {
    /// Suggestions offered in the skip dialog, in display order.
    pub const SUGGESTIONS: [SkipReason; 4] =
        [Self::AlreadyTaken, Self::FeelingUnwell, Self::ForgotMedication, Self::SideEffects];

    pub fn as_text(&self) -> &str {
        match self {
            Self::AlreadyTaken => "Already taken",
            Self::FeelingUnwell => "Feeling unwell",
            Self::ForgotMedication => "Forgot to bring medication",
            Self::SideEffects => "Side effects",
            Self::Other(text) => text,
        }
    }

    /// Map free text onto a suggestion when it matches one.
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        Self::SUGGESTIONS
            .into_iter()
            .find(|reason| reason.as_text().eq_ignore_ascii_case(trimmed))
            .unwrap_or_else(|| Self::Other(trimmed.to_string()))
    }
}

/// One recorded action against a dose instance.
///
/// Entries are never updated in place; a status change deletes the entry
/// and appends a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeLogEntry {
    pub id: IntakeLogId,
    pub user_id: UserId,
    pub medication_id: MedicationId,
    pub date: NaiveDate,
    /// Scheduled slot the entry resolves. Older entries may lack it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<ClockTime>,
    pub status: IntakeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_time: Option<ClockTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dose_amount: Option<Rational64>,
    /// Servings actually removed from inventory (after clamping).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings_deducted: Option<Rational64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl IntakeLogEntry {
    pub fn taken(
        user_id: UserId,
        dose: &DoseInstance,
        actual_time: ClockTime,
        dose_amount: Rational64,
        servings_deducted: Rational64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            actual_time: Some(actual_time),
            dose_amount: Some(dose_amount),
            servings_deducted: Some(servings_deducted),
            ..Self::base(user_id, dose, IntakeStatus::Taken, None, created_at)
        }
    }

    pub fn missed(
        user_id: UserId,
        dose: &DoseInstance,
        reason: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self::base(user_id, dose, IntakeStatus::Missed, Some(reason), created_at)
    }

    pub fn skipped(
        user_id: UserId,
        dose: &DoseInstance,
        reason: Option<&SkipReason>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let reason = reason.map(|r| r.as_text().to_string());
        Self::base(user_id, dose, IntakeStatus::Skipped, reason, created_at)
    }

    fn base(
        user_id: UserId,
        dose: &DoseInstance,
        status: IntakeStatus,
        reason: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: IntakeLogId::generate(),
            user_id,
            medication_id: dose.medication_id.clone(),
            date: dose.date,
            scheduled_time: Some(dose.scheduled_time),
            status,
            actual_time: None,
            dose_amount: None,
            servings_deducted: None,
            reason,
            created_at,
        }
    }

    /// Whether this entry resolves `dose`.
    ///
    /// Medication and date must be equal. When `exact_time` is set (the
    /// medication has several daily times) the scheduled time must match
    /// too; otherwise it is advisory.
    pub fn matches(&self, dose: &DoseInstance, exact_time: bool) -> bool {
        self.medication_id == dose.medication_id
            && self.date == dose.date
            && (!exact_time || self.scheduled_time == Some(dose.scheduled_time))
    }

    /// Servings a revert of this entry gives back to inventory.
    pub fn restorable_servings(&self) -> Rational64 {
        match self.status {
            IntakeStatus::Taken => self
                .servings_deducted
                .or(self.dose_amount)
                .unwrap_or_else(Rational64::zero),
            IntakeStatus::Missed | IntakeStatus::Skipped => Rational64::zero(),
        }
    }
}
