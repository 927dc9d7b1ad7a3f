//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for MedMinder
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum MedMinderError {
    /// Medication or intake log store failure (unreachable, rejected write).
    #[error("Store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Local notification scheduling failure.
    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The requested transition is not legal for the dose's current state.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MedMinderError {
    /// Collaborator failures that a caller may retry unchanged.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Network(_) | Self::Notification(_))
    }
}

/// Result type alias for MedMinder operations
pub type Result<T> = std::result::Result<T, MedMinderError>;
