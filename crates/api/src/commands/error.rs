use medminder_domain::MedMinderError;
use serde::Serialize;
use thiserror::Error;

use crate::utils::logging::error_label;

/// Error shape returned to the front end
///
/// `retryable` marks collaborator failures where repeating the same call
/// may succeed, so the UI can offer "try again" instead of an error dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{code}: {message}")]
pub struct CommandError {
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
}

impl From<MedMinderError> for CommandError {
    fn from(error: MedMinderError) -> Self {
        Self { code: error_label(&error), retryable: error.is_transient(), message: error.to_string() }
    }
}
