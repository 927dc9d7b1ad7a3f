//! Device-local cache adapters.

pub mod moka_cache;

pub use moka_cache::MokaLocalCache;
