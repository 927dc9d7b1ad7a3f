//! Snooze limits and grace-period expiry

pub mod coordinator;
pub mod timers;

pub use coordinator::{GraceOutcome, SnoozeCoordinator, SnoozeTimer};
pub use timers::{TimerHandle, TimerKind, TimerRegistry};
