//! Adherence statistics derived from the intake log

pub mod aggregator;

pub use aggregator::{compute_stats, daily_adherence, streaks};
