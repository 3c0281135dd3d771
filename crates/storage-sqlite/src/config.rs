//! Storage tuning knobs.

use std::time::Duration;

/// Default number of pooled connections.
pub const DEFAULT_POOL_SIZE: u32 = 8;

/// Default deadline for a single store operation.
pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(3);

/// Settings for opening the SQLite store.
///
/// `op_timeout` bounds every store operation: it is the pool checkout
/// timeout, the SQLite busy timeout and the deadline for a write job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub db_path: String,
    pub pool_size: u32,
    pub op_timeout: Duration,
}

impl StorageConfig {
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            pool_size: DEFAULT_POOL_SIZE,
            op_timeout: DEFAULT_OP_TIMEOUT,
        }
    }

    pub fn with_pool_size(mut self, pool_size: u32) -> Self {
        self.pool_size = pool_size.max(1);
        self
    }

    pub fn with_op_timeout(mut self, op_timeout: Duration) -> Self {
        self.op_timeout = op_timeout;
        self
    }

    /// Busy timeout handed to SQLite, in milliseconds.
    pub(crate) fn busy_timeout_ms(&self) -> u64 {
        u64::try_from(self.op_timeout.as_millis()).unwrap_or(u64::MAX)
    }
}
