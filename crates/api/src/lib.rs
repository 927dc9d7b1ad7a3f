//! # MedMinder App
//!
//! Headless application layer - boundary commands and main entry point.
//!
//! This crate contains:
//! - Commands taking raw string input from the front end
//! - Application context (dependency injection)
//! - Logging bootstrap
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture
//! - Validates boundary input before it reaches the core

pub mod commands;
pub mod context;
pub mod utils;

// Re-export for convenience
pub use commands::*;
pub use context::*;
