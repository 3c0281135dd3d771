//! Bounded retry for read-derive-write cycles that lose a version race.

use std::future::Future;
use std::time::Duration;

use log::{debug, warn};

use crate::errors::Result;

/// How many times a read-derive-write cycle may run and how long to wait
/// between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Zero is treated as one.
    pub max_attempts: u32,
    /// Delay before the second attempt; grows linearly with the attempt number.
    pub base_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(10),
            max_backoff: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_backoff: Duration) -> Self {
        Self {
            max_attempts,
            base_backoff,
            ..Self::default()
        }
    }

    /// Retries immediately, used by tests.
    pub fn without_backoff(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.base_backoff
            .saturating_mul(attempt)
            .min(self.max_backoff)
    }
}

/// Runs `op` until it succeeds, fails with a non-conflict error, or the
/// policy's attempts are used up.
///
/// `op` receives the 1-based attempt number and must re-read everything it
/// depends on; it must never carry a version token over from a previous
/// attempt. Only conflicts are retried. On exhaustion the last conflict error
/// is returned unchanged.
pub async fn retry_on_conflict<T, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = policy.attempts();
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("{} succeeded on attempt {}/{}", label, attempt, attempts);
                }
                return Ok(value);
            }
            Err(err) if err.is_conflict() && attempt < attempts => {
                let delay = policy.backoff_for(attempt);
                warn!(
                    "{} hit a version conflict on attempt {}/{}, retrying in {:?}",
                    label, attempt, attempts, delay
                );
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                attempt += 1;
            }
            Err(err) => {
                if err.is_conflict() {
                    warn!("{} gave up after {} conflicting attempts", label, attempts);
                }
                return Err(err);
            }
        }
    }
}
