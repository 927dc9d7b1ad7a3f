use std::time::Duration;

use medminder_domain::{LoggingConfig, MedMinderError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `logging.level`. Calling this twice is
/// harmless: the second subscriber is rejected and the first stays active.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    let installed =
        if config.json { builder.json().try_init() } else { builder.compact().try_init() };
    installed.is_ok()
}

/// Log the outcome of a command execution with structured fields.
///
/// # Parameters
/// * `command` - Logical command identifier (e.g. `"doses::take_dose"`).
/// * `elapsed` - Duration the command execution took.
/// * `error` - Stable label of the failure, `None` on success.
///
/// Callers must avoid forwarding medication names or reasons in `command`.
#[inline]
pub fn log_command_execution(command: &str, elapsed: Duration, error: Option<&'static str>) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    match error {
        None => info!(command, duration_ms, "command_execution_success"),
        Some(error) => warn!(command, duration_ms, error, "command_execution_failure"),
    }
}

/// Convert a `MedMinderError` into a stable label suitable for logging and
/// front-end error codes.
#[inline]
pub fn error_label(error: &MedMinderError) -> &'static str {
    match error {
        MedMinderError::Store(_) => "store",
        MedMinderError::Config(_) => "config",
        MedMinderError::Notification(_) => "notification",
        MedMinderError::Network(_) => "network",
        MedMinderError::NotFound(_) => "not_found",
        MedMinderError::InvalidInput(_) => "invalid_input",
        MedMinderError::Conflict(_) => "conflict",
        MedMinderError::Internal(_) => "internal",
    }
}
