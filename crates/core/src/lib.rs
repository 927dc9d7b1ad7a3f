//! # MedMinder Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Day-pattern evaluation and the due-dose scanner
//! - The dose lifecycle (taken / missed / skipped / revert)
//! - Snooze limits and grace-period expiry
//! - Adherence statistics
//! - Port/adapter interfaces (traits)
//!
//! ## Architecture Principles
//! - Only depends on `medminder-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod adherence;
pub mod intake;
pub mod medication;
pub mod reminders;
pub mod schedule;
pub mod snooze;
pub mod subscription;

#[cfg(test)]
pub(crate) mod testing;

// Infrastructure ports
pub mod cache_ports;
pub mod clock_ports;
pub mod notification_ports;

// Re-export specific items to avoid ambiguity
pub use adherence::{compute_stats, daily_adherence};
pub use cache_ports::LocalCache;
pub use clock_ports::{Clock, FixedClock};
pub use intake::ports::{IntakeLogListener, IntakeLogStore};
pub use intake::IntakeService;
pub use medication::lookup::{rank_suggestions, search_medications, MedicationSuggestion};
pub use medication::ports::{MedicationLookup, MedicationStore, MedicationsListener};
pub use medication::MedicationService;
pub use notification_ports::{NotificationHandle, NotificationScheduler};
pub use reminders::ledger::DoseLedger;
pub use reminders::ports::{ReminderPresenter, RescanTrigger};
pub use reminders::ReminderScanner;
pub use schedule::{day_schedule, doses_on, is_scheduled_on};
pub use snooze::{GraceOutcome, SnoozeCoordinator, SnoozeTimer, TimerHandle, TimerRegistry};
pub use subscription::Subscription;
