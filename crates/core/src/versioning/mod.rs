//! Optimistic concurrency control shared by all versioned entities.

mod retry;
mod versioning_traits;

pub use retry::{retry_on_conflict, RetryPolicy};
pub use versioning_traits::{VersionedRecord, VersionedRepositoryTrait};
