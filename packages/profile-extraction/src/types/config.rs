//! Configuration for profile extraction runs.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ConfigError;

/// Configuration for a profile extraction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Model identifier sent with every attempt of a run.
    ///
    /// Default: "gpt-4o".
    pub model: String,

    /// Total generation attempts, including the first one.
    ///
    /// `1` means no correction requests at all. Default: 3.
    pub max_attempts: usize,

    /// Per-page fetch timeout in milliseconds.
    ///
    /// Default: 10000 (10s).
    pub fetch_timeout_ms: u64,

    /// Per-call completion timeout in milliseconds.
    ///
    /// Default: 120000 (120s).
    pub completion_timeout_ms: u64,

    /// Maximum pages fetched at once.
    ///
    /// Default: 8.
    pub fetch_concurrency: usize,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            max_attempts: 3,
            fetch_timeout_ms: 10_000,
            completion_timeout_ms: 120_000,
            fetch_concurrency: 8,
        }
    }
}

impl ProfileConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load overrides from `PROFILE_*` environment variables.
    ///
    /// Unset variables keep their defaults; set but unparseable ones are an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(model) = std::env::var("PROFILE_MODEL") {
            config.model = model;
        }
        if let Some(n) = env_parse("PROFILE_MAX_ATTEMPTS")? {
            config.max_attempts = n;
        }
        if let Some(secs) = env_parse::<u64>("PROFILE_FETCH_TIMEOUT_SECS")? {
            config.fetch_timeout_ms = secs.saturating_mul(1000);
        }
        if let Some(secs) = env_parse::<u64>("PROFILE_COMPLETION_TIMEOUT_SECS")? {
            config.completion_timeout_ms = secs.saturating_mul(1000);
        }
        if let Some(n) = env_parse("PROFILE_FETCH_CONCURRENCY")? {
            config.fetch_concurrency = n;
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the attempt budget.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the per-page fetch timeout (millisecond precision).
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout_ms = duration_ms(timeout);
        self
    }

    /// Set the per-call completion timeout (millisecond precision).
    pub fn with_completion_timeout(mut self, timeout: Duration) -> Self {
        self.completion_timeout_ms = duration_ms(timeout);
        self
    }

    /// Set fetch concurrency.
    pub fn with_fetch_concurrency(mut self, concurrency: usize) -> Self {
        self.fetch_concurrency = concurrency;
        self
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn completion_timeout(&self) -> Duration {
        Duration::from_millis(self.completion_timeout_ms)
    }

    /// Reject settings no run can honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid("max_attempts must be at least 1".into()));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model must not be empty".into()));
        }
        if self.fetch_concurrency == 0 {
            return Err(ConfigError::Invalid("fetch_concurrency must be at least 1".into()));
        }
        if self.fetch_timeout_ms == 0 {
            return Err(ConfigError::Invalid("fetch timeout must be at least 1ms".into()));
        }
        if self.completion_timeout_ms == 0 {
            return Err(ConfigError::Invalid("completion timeout must be at least 1ms".into()));
        }
        Ok(())
    }
}

/// Whole milliseconds, rounded up so a non-zero timeout never becomes zero.
fn duration_ms(timeout: Duration) -> u64 {
    let ms = timeout.as_millis() + u128::from(timeout.subsec_nanos() % 1_000_000 != 0);
    u64::try_from(ms).unwrap_or(u64::MAX)
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv {
                key: key.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}
