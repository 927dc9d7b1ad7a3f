//! HTTP client shared by catalogue adapters.

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
