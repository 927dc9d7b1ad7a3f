//! Time source port.
//!
//! Dose arithmetic runs on device-local wall-clock time, so `now` returns a
//! naive local datetime. Record timestamps use UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Port for reading the current time
pub trait Clock: Send + Sync {
    /// Current device-local date and time.
    fn now(&self) -> NaiveDateTime;

    /// Current instant for `created_at` stamps.
    fn timestamp(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Clock frozen at a fixed local time. Useful for replays and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    now: NaiveDateTime,
    timestamp: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now, timestamp: now.and_utc() }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.now
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
