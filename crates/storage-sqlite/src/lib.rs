//! SQLite storage implementation for Nestegg.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `nestegg-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - Repository implementations for savings targets and notifications
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! The core crate is database-agnostic and works with traits.
//!
//! ```text
//!     core (domain)        server (http, scheduler)
//!           │                      │
//!           └──────────┬───────────┘
//!                      │
//!                      ▼
//!          storage-sqlite (this crate)
//!                      │
//!                      ▼
//!                  SQLite DB
//! ```
//!
//! All writes go through a single writer task ([`WriteHandle`]), each job in
//! its own immediate transaction, so a savings changeset is applied entirely
//! or not at all.

pub mod db;
pub mod errors;
pub mod schema;

// Repository implementations
pub mod notifications;
pub mod savings;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use notifications::NotificationRepository;
pub use savings::SavingsRepository;

// Re-export from nestegg-core for convenience
pub use nestegg_core::errors::{DatabaseError, Error, Result};

#[cfg(test)]
mod test_support;
