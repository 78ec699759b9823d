//! Error types for the actionflow runtime.
//!
//! Executors report failures through [`ActionError`]. The retry controller
//! matches on the variant to decide whether an attempt may be repeated, so
//! classification never depends on inspecting ad hoc fields.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::validation::ValidationIssue;

/// Fallback message used when a failure carries no text of its own.
pub const GENERIC_ERROR_MESSAGE: &str = "Execution error";

/// Classified failure raised by validation or by an executor.
#[derive(Debug, Clone, Error)]
pub enum ActionError {
    /// Input did not conform to the declared shape.
    #[error("Invalid input: {}", render_issues(.issues))]
    Validation {
        /// Field-level issues, in the order they were found.
        issues: Vec<ValidationIssue>,
    },

    /// A transient failure that may succeed on another attempt.
    #[error("{message}")]
    Retryable {
        /// Human-readable message.
        message: String,
        /// Optional machine-readable code.
        code: Option<String>,
    },

    /// A failure that must not be retried.
    #[error("{message}")]
    Fatal {
        /// Human-readable message.
        message: String,
        /// Optional machine-readable code.
        code: Option<String>,
    },

    /// The attempt did not complete before its deadline.
    #[error("execution timed out after {timeout_ms}ms")]
    Timeout {
        /// The configured per-attempt deadline.
        timeout_ms: u64,
    },
}

fn render_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ValidationIssue::render)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ActionError {
    /// Creates a retryable error.
    #[must_use]
    pub fn retryable(message: impl Into<String>) -> Self {
        Self::Retryable {
            message: message.into(),
            code: None,
        }
    }

    /// Creates a fatal error.
    #[must_use]
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::Fatal {
            message: message.into(),
            code: None,
        }
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(timeout_ms: u64) -> Self {
        Self::Timeout { timeout_ms }
    }

    /// Creates a validation error from a list of issues.
    #[must_use]
    pub fn validation(issues: Vec<ValidationIssue>) -> Self {
        Self::Validation { issues }
    }

    /// Attaches a machine-readable code. No-op for timeout and validation errors.
    #[must_use]
    pub fn with_code(mut self, new_code: impl Into<String>) -> Self {
        match &mut self {
            Self::Retryable { code, .. } | Self::Fatal { code, .. } => {
                *code = Some(new_code.into());
            }
            Self::Timeout { .. } | Self::Validation { .. } => {}
        }
        self
    }

    /// Returns true if the error is eligible for another attempt.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable { .. })
    }

    /// Returns true if the error is a deadline expiry.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns the failure category name used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "ValidationFailure",
            Self::Retryable { .. } => "RetryableFailure",
            Self::Fatal { .. } => "FatalFailure",
            Self::Timeout { .. } => "TimeoutFailure",
        }
    }

    /// Returns the machine-readable code, if any.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Retryable { code, .. } | Self::Fatal { code, .. } => code.as_deref(),
            Self::Timeout { .. } => Some("TIMEOUT"),
            Self::Validation { .. } => Some("INVALID_INPUT"),
        }
    }

    /// Returns the message surfaced to callers, falling back to a generic
    /// message when the error carries none.
    #[must_use]
    pub fn public_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_ERROR_MESSAGE.to_string()
        } else {
            message
        }
    }

    /// Converts to a dictionary representation for structured logs.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("error_name".to_string(), serde_json::json!(self.name()));
        map.insert("error_code".to_string(), serde_json::json!(self.code()));
        map.insert("error_message".to_string(), serde_json::json!(self.public_message()));
        if let Self::Validation { issues } = self {
            map.insert(
                "issues".to_string(),
                serde_json::json!(issues.iter().map(ValidationIssue::render).collect::<Vec<_>>()),
            );
        }
        map
    }
}

impl From<anyhow::Error> for ActionError {
    fn from(err: anyhow::Error) -> Self {
        Self::fatal(format!("{err:#}"))
    }
}

/// Error raised by a lifecycle hook.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{hook} hook failed: {message}")]
pub struct HookError {
    /// Which hook failed (`before` or `after`).
    pub hook: String,
    /// The failure message.
    pub message: String,
}

impl HookError {
    /// Creates a new hook error.
    #[must_use]
    pub fn new(hook: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            hook: hook.into(),
            message: message.into(),
        }
    }
}

/// Errors raised while loading runner configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable held a value that could not be parsed.
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        /// The variable name.
        key: String,
        /// The raw value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The configuration document could not be deserialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
