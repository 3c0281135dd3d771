use async_trait::async_trait;

use crate::errors::Result;

/// Capability shared by every entity that takes part in optimistic
/// concurrency control.
///
/// The version counter starts at 1 on insert and grows by exactly one on
/// every successful update. It is the only concurrency token: timestamps and
/// row contents play no part in conflict detection.
pub trait VersionedRecord {
    fn id(&self) -> i64;
    fn version(&self) -> i32;
    fn is_deleted(&self) -> bool;

    /// Stores the version returned by a successful compare-and-swap.
    fn set_version(&mut self, version: i32);
}

/// Persistence contract for a versioned entity `T` created from `N`.
///
/// Implemented once per entity schema by the storage layer. Every operation
/// is scoped to the owning user: a record that belongs to somebody else is
/// indistinguishable from one that does not exist.
#[async_trait]
pub trait VersionedRepositoryTrait<T, N>: Send + Sync
where
    T: VersionedRecord + Send + Sync + 'static,
    N: Send + 'static,
{
    /// Assigns identity, `version = 1` and the creation timestamp at the store.
    /// Uniqueness violations surface as `DatabaseError::UniqueViolation`.
    async fn insert(&self, new_record: N) -> Result<T>;

    /// Conditional write matching `id`, `version` and `deleted = false`.
    ///
    /// Returns the new version (`record.version() + 1`). When nothing matched
    /// the result is `DatabaseError::EditConflict` and nothing was written.
    async fn update(&self, user_id: i64, record: &T) -> Result<i32>;

    /// Sets the deleted flag without a version check. Fails with a not-found
    /// error (see `Error::is_not_found`) when the record is missing, already
    /// deleted, or foreign.
    async fn soft_delete(&self, user_id: i64, id: i64) -> Result<()>;

    /// `update`, then copies the new version into `record`.
    async fn update_in_place(&self, user_id: i64, record: &mut T) -> Result<()> {
        let version = self.update(user_id, record).await?;
        record.set_version(version);
        Ok(())
    }
}
