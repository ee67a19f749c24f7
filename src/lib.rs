//! LeadHub — library crate for integration testing.
//!
//! Re-exports modules needed by integration tests in `tests/`.

pub mod config;
pub mod currency;
pub mod errors;
pub mod models;
pub mod nudge;
