//! Shared context for app integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use medminder_core::FixedClock;
use medminder_domain::{
    ClockTime, Config, DayPattern, DueReminder, MedicationDraft, MedicationForm, ScheduleType,
    UserId,
};
use medminder_infra::ChannelReminderPresenter;
use medminder_lib::commands::DoseRef;
use medminder_lib::AppContext;
use num_rational::Rational64;
use tokio::sync::mpsc::UnboundedReceiver;

pub const USER: &str = "user-1";
pub const TODAY: &str = "2024-03-04";

pub fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 4).unwrap().and_hms_opt(8, 30, 0).unwrap()
}

pub struct TestContext {
    pub ctx: AppContext,
    pub presented: UnboundedReceiver<(UserId, DueReminder)>,
}

/// Context over in-memory adapters with the clock frozen at 08:30 and the
/// remote catalogue pointed at `lookup_url` (disabled when `None`).
pub fn setup_test_context(lookup_url: Option<String>) -> TestContext {
    let mut config = Config::default();
    config.reminders.scan_cron = "0 0 0 1 1 *".into();
    config.lookup.enabled = lookup_url.is_some();
    if let Some(url) = lookup_url {
        config.lookup.base_url = url;
        config.lookup.timeout_seconds = 2;
    }
    let (presenter, presented) = ChannelReminderPresenter::channel();
    let ctx =
        AppContext::with_parts(config, Arc::new(FixedClock::new(now())), Arc::new(presenter))
            .expect("context builds");
    TestContext { ctx, presented }
}

pub fn draft(name: &str, times: &[&str]) -> MedicationDraft {
    MedicationDraft {
        name: name.to_string(),
        dosage: "500".into(),
        dosage_unit: "mg".into(),
        form: MedicationForm::Pill,
        schedule_type: ScheduleType::FixedTimes,
        times: times.iter().map(|t| t.parse::<ClockTime>().unwrap()).collect(),
        day_pattern: DayPattern::Everyday,
        serving_size: Rational64::from_integer(1),
        servings_per_container: 10,
        current_servings: None,
        refill_threshold: 3,
    }
}

pub fn dose<'a>(medication_id: &'a str, time: &'a str) -> DoseRef<'a> {
    DoseRef { user_id: USER, medication_id, date: TODAY, time }
}
