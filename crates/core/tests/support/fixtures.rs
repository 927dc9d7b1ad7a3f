//! Fixture builders for medications, doses and dates.

use chrono::{NaiveDate, NaiveDateTime};
use medminder_domain::{
    ClockTime, DayPattern, DoseInstance, Medication, MedicationForm, ScheduleType, UserId,
};
use num_rational::Rational64;

pub fn user() -> UserId {
    UserId::from("user-1")
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(date: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    date.and_hms_opt(hour, minute, 0).unwrap()
}

pub fn time(value: &str) -> ClockTime {
    value.parse().unwrap()
}

pub fn dose(medication_id: &str, date: NaiveDate, at: &str) -> DoseInstance {
    DoseInstance::new(medication_id.into(), date, time(at))
}

pub fn servings(whole: i64) -> Rational64 {
    Rational64::from_integer(whole)
}

/// Everyday medication with one serving per dose and a 30-serving container.
pub fn medication(id: &str, name: &str, times: &[&str]) -> Medication {
    let added_at = at(day(2024, 1, 1), 0, 0);
    Medication {
        id: id.into(),
        user_id: user(),
        name: name.to_string(),
        dosage: "10".into(),
        dosage_unit: "mg".into(),
        form: MedicationForm::Pill,
        schedule_type: ScheduleType::FixedTimes,
        times: times.iter().map(|t| time(t)).collect(),
        day_pattern: DayPattern::Everyday,
        serving_size: servings(1),
        servings_per_container: 30,
        current_servings: servings(30),
        refill_threshold: 5,
        added_at,
        created_at: added_at.and_utc(),
    }
}
