//! Schedule evaluation: which doses exist on a given day

pub mod day_pattern;
pub mod day_view;

pub use day_pattern::{doses_on, is_scheduled_on};
pub use day_view::day_schedule;
