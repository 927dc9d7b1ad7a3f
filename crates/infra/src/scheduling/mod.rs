//! Scheduling infrastructure for the reminder loop
//!
//! A cron-driven scheduler scans every watched user's doses on each tick,
//! and a rescan channel lets snooze timers request an immediate scan.
//!
//! All tasks follow the same runtime rules:
//! - Explicit lifecycle management (start/stop)
//! - Join handles for spawned tasks
//! - Cancellation token support
//! - Timeout wrapping on all async operations

pub mod error;
pub mod reminder_job;
pub mod reminder_scheduler;
pub mod rescan;

pub use error::{SchedulerError, SchedulerResult};
pub use reminder_job::{ReminderJob, ScanReport};
pub use reminder_scheduler::{ReminderScheduler, ReminderSchedulerConfig};
pub use rescan::ChannelRescanTrigger;
