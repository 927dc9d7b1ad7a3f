//! In-process medication and intake log stores
//!
//! Both stores keep records in memory and push the affected user's full
//! list to every live subscriber after each change.

mod listeners;
pub mod intake_logs;
pub mod medications;

pub use intake_logs::InMemoryIntakeLogStore;
pub use medications::InMemoryMedicationStore;
