//! Wall-clock time source.

use chrono::{Local, NaiveDateTime};
use medminder_core::Clock;

/// [`Clock`] reading the device's local time zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}
