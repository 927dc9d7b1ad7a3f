//! Boundary commands
//!
//! Every command takes raw strings from the front end, validates them,
//! calls into the core and maps failures to a [`CommandError`].

pub mod doses;
pub mod error;
pub mod medications;
pub mod reports;

pub use doses::*;
pub use error::CommandError;
pub use medications::*;
pub use reports::*;
