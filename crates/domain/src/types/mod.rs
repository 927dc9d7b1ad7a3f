//! Domain types and models

pub mod intake;
pub mod medication;
pub mod reminder;
pub mod schedule;
pub mod stats;

pub use intake::{DoseState, IntakeLogEntry, IntakeLogId, IntakeStatus, SkipReason};
pub use medication::{
    check_amount, Medication, MedicationDraft, MedicationForm, MedicationId, MedicationPatch,
    ScheduleType, UserId,
};
pub use reminder::{DoseView, DueReminder};
pub use schedule::{ClockTime, DayPattern, DoseInstance, MINUTES_PER_DAY};
pub use stats::{percentage, AdherenceStats, DayAdherence, MedicationAdherence};
