use std::time::Duration;

use goalledger_core::versioning::RetryPolicy;
use goalledger_storage_sqlite::config::{DEFAULT_OP_TIMEOUT, DEFAULT_POOL_SIZE};

pub struct Config {
    /// Directory holding `goalledger.db` unless `DATABASE_URL` points elsewhere.
    pub data_dir: String,
    pub pool_size: u32,
    pub op_timeout: Duration,
    pub retry_policy: RetryPolicy,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Unparseable numbers fall
    /// back to their defaults with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = RetryPolicy::default();
        let data_dir = lookup("GOALLEDGER_DATA_DIR").unwrap_or_else(|| "./db".into());
        let pool_size = parse_or(&lookup, "GOALLEDGER_POOL_SIZE", DEFAULT_POOL_SIZE);
        let op_timeout_ms = parse_or(
            &lookup,
            "GOALLEDGER_OP_TIMEOUT_MS",
            DEFAULT_OP_TIMEOUT.as_millis() as u64,
        );
        let attempts = parse_or(
            &lookup,
            "GOALLEDGER_RECONCILE_ATTEMPTS",
            defaults.max_attempts,
        );
        let backoff_ms = parse_or(
            &lookup,
            "GOALLEDGER_RECONCILE_BACKOFF_MS",
            defaults.base_backoff.as_millis() as u64,
        );

        Self {
            data_dir,
            pool_size: pool_size.max(1),
            op_timeout: Duration::from_millis(op_timeout_ms),
            retry_policy: RetryPolicy::new(attempts, Duration::from_millis(backoff_ms)),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid {}={:?}, using {}", key, raw, default);
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]);
        assert_eq!(config.data_dir, "./db");
        assert_eq!(config.pool_size, 8);
        assert_eq!(config.op_timeout, Duration::from_secs(3));
        assert_eq!(config.retry_policy, RetryPolicy::default());
    }

    #[test]
    fn values_are_read_from_the_environment() {
        let config = config_from(&[
            ("GOALLEDGER_DATA_DIR", "/var/lib/goalledger"),
            ("GOALLEDGER_POOL_SIZE", "4"),
            ("GOALLEDGER_OP_TIMEOUT_MS", "1500"),
            ("GOALLEDGER_RECONCILE_ATTEMPTS", "5"),
            ("GOALLEDGER_RECONCILE_BACKOFF_MS", "0"),
        ]);
        assert_eq!(config.data_dir, "/var/lib/goalledger");
        assert_eq!(config.pool_size, 4);
        assert_eq!(config.op_timeout, Duration::from_millis(1500));
        assert_eq!(config.retry_policy.max_attempts, 5);
        assert_eq!(config.retry_policy.base_backoff, Duration::ZERO);
    }

    #[test]
    fn invalid_numbers_fall_back_to_defaults() {
        let config = config_from(&[
            ("GOALLEDGER_POOL_SIZE", "lots"),
            ("GOALLEDGER_RECONCILE_ATTEMPTS", "-1"),
        ]);
        assert_eq!(config.pool_size, 8);
        assert_eq!(config.retry_policy.max_attempts, 3);
    }
}
