//! Due-dose detection and the per-dose reminder ledger

pub mod ledger;
pub mod ports;
pub mod scanner;

pub use scanner::{due_minutes, ReminderScanner};
