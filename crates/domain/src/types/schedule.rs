//! Clock times, day-recurrence patterns and dose instances

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::types::medication::MedicationId;
use crate::{MedMinderError, Result};

/// Minutes in a calendar day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// A wall-clock time of day (`HH:MM`) in device-local time, no timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    /// # Errors
    /// Returns `MedMinderError::InvalidInput` when outside 00:00–23:59.
    pub fn new(hour: u8, minute: u8) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(MedMinderError::InvalidInput(format!(
                "clock time out of range: {hour:02}:{minute:02}"
            )));
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(self) -> u8 {
        self.hour
    }

    pub fn minute(self) -> u8 {
        self.minute
    }

    pub fn minutes_of_day(self) -> u32 {
        u32::from(self.hour) * 60 + u32::from(self.minute)
    }

    /// Truncates seconds; used to normalise a device instant.
    pub fn from_naive_time(time: NaiveTime) -> Self {
        use chrono::Timelike;
        // hour() < 24 and minute() < 60 by construction
        Self { hour: time.hour() as u8, minute: time.minute() as u8 }
    }

    pub fn to_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(u32::from(self.hour), u32::from(self.minute), 0)
            .unwrap_or(NaiveTime::MIN)
    }

    /// The instant this time falls on for `date`.
    pub fn on(self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.to_naive_time())
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for ClockTime {
    type Err = MedMinderError;

    /// Accepts `H:MM` and `HH:MM`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || MedMinderError::InvalidInput(format!("malformed clock time: {s:?}"));
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(invalid());
        }
        let hour = hour.parse::<u8>().map_err(|_| invalid())?;
        let minute = minute.parse::<u8>().map_err(|_| invalid())?;
        Self::new(hour, minute)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = MedMinderError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

/// Day-recurrence rule deciding which calendar days a medication is due.
///
/// Unrecognised stored patterns deserialize to [`DayPattern::Unrecognized`],
/// which evaluates like `Everyday`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DayPattern {
    #[default]
    Everyday,
    Weekdays,
    Weekends,
    /// Active on the anchor and every second day from it.
    #[serde(alias = "everyother")]
    EveryOtherDay {
        #[serde(default)]
        anchor: Option<NaiveDate>,
    },
    #[serde(alias = "specific")]
    SpecificWeekdays {
        #[serde(default)]
        days: Vec<Weekday>,
    },
    #[serde(rename = "specific-calendar-dates", alias = "calendar")]
    SpecificCalendarDates {
        #[serde(default)]
        dates: BTreeSet<NaiveDate>,
    },
    #[serde(other)]
    Unrecognized,
}

impl DayPattern {
    pub fn every_other_day_from(anchor: NaiveDate) -> Self {
        Self::EveryOtherDay { anchor: Some(anchor) }
    }

    pub fn on_weekdays(days: impl IntoIterator<Item = Weekday>) -> Self {
        Self::SpecificWeekdays { days: days.into_iter().collect() }
    }

    pub fn on_dates(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self::SpecificCalendarDates { dates: dates.into_iter().collect() }
    }
}

/// One scheduled occurrence of a medication: (medication, date, clock-time).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DoseInstance {
    pub medication_id: MedicationId,
    pub date: NaiveDate,
    pub scheduled_time: ClockTime,
}

impl DoseInstance {
    pub fn new(medication_id: MedicationId, date: NaiveDate, scheduled_time: ClockTime) -> Self {
        Self { medication_id, date, scheduled_time }
    }

    pub fn scheduled_at(&self) -> NaiveDateTime {
        self.scheduled_time.on(self.date)
    }
}

impl fmt::Display for DoseInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}T{}", self.medication_id, self.date, self.scheduled_time)
    }
}
