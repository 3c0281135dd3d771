//! SQLite storage implementation for goalledger.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `goalledger-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - Compare-and-swap writes for versioned goals and ledger entries
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! The core crate is database-agnostic and works with traits.
//!
//! ```text
//!          core (domain)
//!                │
//!                ▼
//!   storage-sqlite (this crate)
//!                │
//!                ▼
//!            SQLite DB
//! ```
//!
//! All writes go through a single writer actor that runs each job in an
//! immediate transaction; reads use the pool directly.

pub mod config;
pub mod db;
pub mod errors;
pub mod schema;

mod versioning;

// Repository implementations
pub mod goal_progress;
pub mod goals;

// Re-export database utilities
pub use db::{
    create_pool, create_pool_with_config, get_connection, get_db_path, init, run_migrations,
    spawn_writer, DbConnection, DbPool, WriteHandle,
};

pub use config::StorageConfig;

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from goalledger-core for convenience
pub use goalledger_core::errors::{DatabaseError, Error, Result};
