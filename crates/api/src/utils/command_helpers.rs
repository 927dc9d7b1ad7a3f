//! Command execution helpers
//!
//! Provides utilities to reduce boilerplate when implementing commands with
//! timing and logging.

use std::future::Future;
use std::time::Instant;

use medminder_domain::Result as DomainResult;

use crate::commands::CommandError;
use crate::utils::logging::{error_label, log_command_execution};

/// Execute a command with automatic timing, logging and error mapping
///
/// # Example
///
/// ```rust,ignore
/// pub async fn my_command(ctx: &AppContext, raw: &str) -> Result<MyResponse, CommandError> {
///     execute_command("my_module::my_command", async {
///         let parsed = parse_date(raw)?;
///         ctx.some_service.do_something(parsed).await
///     })
///     .await
/// }
/// ```
pub async fn execute_command<Fut, T>(command_name: &str, command: Fut) -> Result<T, CommandError>
where
    Fut: Future<Output = DomainResult<T>>,
{
    let start = Instant::now();
    let result = command.await;

    log_command_execution(command_name, start.elapsed(), result.as_ref().err().map(error_label));

    result.map_err(CommandError::from)
}
