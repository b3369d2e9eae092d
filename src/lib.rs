//! MNEE API Gateway Library
//!
//! This crate exposes the MNEE 1Sat token client over a REST interface.
//! Handlers validate input, make a single call into the shared MNEE client,
//! and reshape the result into a uniform JSON envelope.

pub mod api;
pub mod config;
pub mod mnee_client;

// Re-export commonly used types
pub use api::{ApiResponse, ApiServer};
pub use config::Config;
pub use mnee_client::{init_mnee_client, MneeApi};
