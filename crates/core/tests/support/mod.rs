//! Shared test helpers for `medminder-core` integration tests.
//!
//! These helpers provide in-memory ports and a wired-up service harness so
//! tests can focus on dose behaviour instead of boilerplate.

#![allow(dead_code)]

pub mod fixtures;
pub mod repositories;

use std::sync::Arc;

use chrono::NaiveDateTime;
use medminder_core::{
    DoseLedger, FixedClock, IntakeService, ReminderScanner, SnoozeCoordinator, TimerRegistry,
};
use medminder_domain::constants::{DEFAULT_GRACE_PERIOD_MINUTES, DEFAULT_MAX_SNOOZES};

pub use fixtures::*;
pub use repositories::*;

/// Services wired over in-memory ports with a frozen clock.
pub struct Harness {
    pub medications: Arc<MockMedicationStore>,
    pub logs: Arc<MockIntakeLogStore>,
    pub cache: Arc<MockCache>,
    pub rescans: Arc<RecordingRescan>,
    pub timers: Arc<TimerRegistry>,
    pub intake: Arc<IntakeService>,
    pub scanner: ReminderScanner,
    pub snooze: SnoozeCoordinator,
}

impl Harness {
    pub fn new(now: NaiveDateTime) -> Self {
        let medications = Arc::new(MockMedicationStore::default());
        let logs = Arc::new(MockIntakeLogStore::default());
        let cache = Arc::new(MockCache::default());
        let rescans = Arc::new(RecordingRescan::default());
        let timers = Arc::new(TimerRegistry::new());
        let ledger = Arc::new(DoseLedger::new(cache.clone(), DEFAULT_MAX_SNOOZES));
        let intake = Arc::new(
            IntakeService::new(
                medications.clone(),
                logs.clone(),
                ledger,
                Arc::new(FixedClock::new(now)),
            )
            .with_timers(timers.clone()),
        );
        let scanner = ReminderScanner::new(intake.clone(), DEFAULT_GRACE_PERIOD_MINUTES);
        let snooze =
            SnoozeCoordinator::new(intake.clone(), rescans.clone(), DEFAULT_GRACE_PERIOD_MINUTES);
        Self { medications, logs, cache, rescans, timers, intake, scanner, snooze }
    }
}
