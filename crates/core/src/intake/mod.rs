//! Dose lifecycle: recording, reverting and resolving intake entries

pub mod ports;
pub mod service;

pub use service::IntakeService;
