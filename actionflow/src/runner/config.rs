//! Runner configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::retry::RetryPolicy;
use crate::errors::ConfigError;

/// Static configuration of an [`ActionRunner`](super::ActionRunner).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Action name used in logs. Falls back to the action's own name.
    #[serde(default)]
    pub name: String,
    /// Per-attempt deadline in milliseconds. `None` or `0` disables it.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Re-attempts after a retryable failure.
    #[serde(default)]
    pub retries: u32,
    /// Base backoff between attempts, multiplied by the failure count.
    #[serde(default)]
    pub retry_backoff_ms: u64,
}

impl RunnerConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the per-attempt timeout.
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Sets the retry budget.
    #[must_use]
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Sets the base backoff.
    #[must_use]
    pub fn with_retry_backoff_ms(mut self, backoff_ms: u64) -> Self {
        self.retry_backoff_ms = backoff_ms;
        self
    }

    /// Returns the effective per-attempt deadline.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }

    /// Returns the retry policy described by this configuration.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retries, self.retry_backoff_ms)
    }

    /// Parses a configuration from a JSON document. Missing keys take their
    /// defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads `<PREFIX>_TIMEOUT_MS`, `<PREFIX>_RETRIES` and
    /// `<PREFIX>_RETRY_BACKOFF_MS` from the process environment.
    pub fn from_env(name: impl Into<String>, prefix: &str) -> Result<Self, ConfigError> {
        Self::from_lookup(name, prefix, |key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable lookup.
    pub fn from_lookup<F>(name: impl Into<String>, prefix: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new(name);

        let timeout_key = format!("{prefix}_TIMEOUT_MS");
        if let Some(raw) = lookup(&timeout_key) {
            config.timeout_ms = Some(parse_var(&timeout_key, &raw)?);
        }

        let retries_key = format!("{prefix}_RETRIES");
        if let Some(raw) = lookup(&retries_key) {
            config.retries = parse_var(&retries_key, &raw)?;
        }

        let backoff_key = format!("{prefix}_RETRY_BACKOFF_MS");
        if let Some(raw) = lookup(&backoff_key) {
            config.retry_backoff_ms = parse_var(&backoff_key, &raw)?;
        }

        Ok(config)
    }
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}
