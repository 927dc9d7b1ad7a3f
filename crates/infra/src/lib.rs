//! # MedMinder Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - Configuration loading (environment, JSON, TOML)
//! - In-memory medication and intake log stores with live subscriptions
//! - The moka-backed local cache
//! - The openFDA catalogue lookup and its offline fallback
//! - The cron-driven reminder scheduler
//!
//! ## Architecture
//! - Implements traits defined in `medminder-core`
//! - Depends on `medminder-domain` and `medminder-core`
//! - Contains all "impure" code (I/O, timers, HTTP)

pub mod cache;
pub mod clock;
pub mod config;
pub mod errors;
pub mod http;
pub mod lookup;
pub mod notifications;
pub mod scheduling;
pub mod stores;

// Re-export commonly used items
pub use cache::MokaLocalCache;
pub use clock::SystemClock;
pub use errors::InfraError;
pub use lookup::{FallbackLookup, OpenFdaLookup};
pub use notifications::{
    ChannelReminderPresenter, TracingNotificationScheduler, TracingReminderPresenter,
};
pub use scheduling::{ChannelRescanTrigger, ReminderJob, ReminderScheduler};
pub use stores::{InMemoryIntakeLogStore, InMemoryMedicationStore};
