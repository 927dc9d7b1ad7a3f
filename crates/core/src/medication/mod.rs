//! Medication management: records, inventory and name lookup

pub mod lookup;
pub mod ports;
pub mod service;

pub use service::MedicationService;
