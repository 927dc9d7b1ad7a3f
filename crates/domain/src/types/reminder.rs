//! Reminder and day-view projections

use num_rational::Rational64;
use serde::{Deserialize, Serialize};

use crate::types::intake::DoseState;
use crate::types::medication::Medication;
use crate::types::schedule::{ClockTime, DoseInstance};

/// A dose currently inside its grace window and eligible for a reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueReminder {
    pub medication: Medication,
    pub dose: DoseInstance,
    /// Minutes elapsed since the scheduled time.
    pub due_minutes: u32,
    pub snooze_count: u32,
}

impl DueReminder {
    pub fn scheduled_time(&self) -> ClockTime {
        self.dose.scheduled_time
    }
}

/// One row of the day view: a dose instance and its derived state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoseView {
    pub dose: DoseInstance,
    pub medication_name: String,
    pub serving_size: Rational64,
    pub state: DoseState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_time: Option<ClockTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
