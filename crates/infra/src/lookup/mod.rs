//! Medication catalogue adapters.

pub mod fallback;
pub mod openfda;

pub use fallback::FallbackLookup;
pub use openfda::OpenFdaLookup;
