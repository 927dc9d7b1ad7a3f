//! Day-pattern evaluator
//!
//! Decides whether a medication is due on a calendar date. Evaluation is
//! pure and total: malformed or unknown patterns never fail, they fall back
//! to "every day" so a reminder is never silently dropped.

use chrono::{Datelike, NaiveDate, Weekday};
use medminder_domain::{DayPattern, DoseInstance, Medication};

/// Whether `pattern` makes a medication active on `date`.
///
/// - `EveryOtherDay` with no anchor treats `date` itself as the anchor.
///   Dates before the anchor follow the same parity.
/// - `SpecificWeekdays` with an empty set is never active.
pub fn is_scheduled_on(pattern: &DayPattern, date: NaiveDate) -> bool {
    match pattern {
        DayPattern::Everyday | DayPattern::Unrecognized => true,
        DayPattern::Weekdays => !is_weekend(date.weekday()),
        DayPattern::Weekends => is_weekend(date.weekday()),
        DayPattern::EveryOtherDay { anchor } => {
            let anchor = anchor.unwrap_or(date);
            (date - anchor).num_days().rem_euclid(2) == 0
        }
        DayPattern::SpecificWeekdays { days } => days.contains(&date.weekday()),
        DayPattern::SpecificCalendarDates { dates } => dates.contains(&date),
    }
}

/// Dose instances of `medication` on `date`, in time order.
///
/// Empty when the pattern is inactive that day or the medication has no
/// scheduled times (as-needed).
pub fn doses_on(medication: &Medication, date: NaiveDate) -> Vec<DoseInstance> {
    if !is_scheduled_on(&medication.day_pattern, date) {
        return Vec::new();
    }
    medication
        .times
        .iter()
        .map(|&time| DoseInstance::new(medication.id.clone(), date, time))
        .collect()
}

fn is_weekend(weekday: Weekday) -> bool {
    matches!(weekday, Weekday::Sat | Weekday::Sun)
}
