//! goalledger core - domain entities, services, and traits.
//!
//! This crate holds the goal tracking logic: optimistic concurrency control
//! over versioned records, the progress ledger, status derivation and the
//! reconciliation that keeps a goal consistent with its ledger. It is
//! database-agnostic and defines traits that are implemented by the
//! `storage-sqlite` crate.

pub mod errors;
pub mod goals;
pub mod pagination;
pub mod utils;
pub mod versioning;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
