//! Cross-cutting helpers for commands and startup.

pub mod command_helpers;
pub mod logging;
pub mod parsing;
