//! Nestegg Core - savings targets, allocation and retirement projection.
//!
//! This crate contains the business logic for Nestegg. It is
//! database-agnostic and defines traits that are implemented by the
//! `storage-sqlite` crate.

pub mod constants;
pub mod errors;
pub mod events;
pub mod savings;
pub mod utils;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
