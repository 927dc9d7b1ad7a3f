//! Fixture builders shared by unit tests.

use chrono::{NaiveDate, NaiveDateTime};
use medminder_domain::{
    ClockTime, DayPattern, DoseInstance, IntakeLogEntry, IntakeStatus, Medication, MedicationForm,
    ScheduleType,
};
use num_rational::Rational64;

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(date: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    date.and_hms_opt(hour, minute, 0).unwrap()
}

pub fn medication(id: &str, name: &str, times: &[&str]) -> Medication {
    let added_at = at(day(2024, 1, 1), 0, 0);
    Medication {
        id: id.into(),
        user_id: "u1".into(),
        name: name.to_string(),
        dosage: "10".into(),
        dosage_unit: "mg".into(),
        form: MedicationForm::Pill,
        schedule_type: ScheduleType::FixedTimes,
        times: times.iter().map(|t| t.parse::<ClockTime>().unwrap()).collect(),
        day_pattern: DayPattern::Everyday,
        serving_size: Rational64::from_integer(1),
        servings_per_container: 30,
        current_servings: Rational64::from_integer(30),
        refill_threshold: 5,
        added_at,
        created_at: added_at.and_utc(),
    }
}

pub fn entry(dose: &DoseInstance, status: IntakeStatus, created: NaiveDateTime) -> IntakeLogEntry {
    let created_at = created.and_utc();
    match status {
        IntakeStatus::Taken => {
            let one = Rational64::from_integer(1);
            let actual = ClockTime::from_naive_time(created.time());
            IntakeLogEntry::taken("u1".into(), dose, actual, one, one, created_at)
        }
        IntakeStatus::Missed => {
            IntakeLogEntry::missed("u1".into(), dose, "No reason provided".into(), created_at)
        }
        IntakeStatus::Skipped => IntakeLogEntry::skipped("u1".into(), dose, None, created_at),
    }
}

pub fn taken_entry(dose: &DoseInstance, created: NaiveDateTime) -> IntakeLogEntry {
    entry(dose, IntakeStatus::Taken, created)
}
