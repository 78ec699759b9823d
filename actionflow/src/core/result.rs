//! The normalized result envelope.

use serde::{Deserialize, Serialize};

use crate::errors::{ActionError, GENERIC_ERROR_MESSAGE};
use crate::validation::ValidationIssue;

/// Message used for results that failed validation.
pub const INVALID_INPUT_MESSAGE: &str = "Invalid input";

/// The uniform outcome of a run.
///
/// Executors build the `success`/`data`/`error` part; the runner always
/// overwrites `trace_id`, `duration_ms` and `attempts` before returning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult<T = serde_json::Value> {
    /// Whether the action succeeded.
    pub success: bool,
    /// Payload produced by the executor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Failure message. Always non-empty when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Rendered validation issues (`"path: message"`). Only set when the
    /// failure originated in validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<String>>,
    /// Correlation id of the run.
    #[serde(default)]
    pub trace_id: String,
    /// Wall-clock duration of the whole run, retries and backoff included.
    #[serde(default)]
    pub duration_ms: f64,
    /// Executor invocations made during the run.
    #[serde(default)]
    pub attempts: u32,
}

impl<T> ActionResult<T> {
    /// Creates a successful result with data.
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            issues: None,
            trace_id: String::new(),
            duration_ms: 0.0,
            attempts: 0,
        }
    }

    /// Creates a successful result with no data.
    #[must_use]
    pub fn ok_empty() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            issues: None,
            trace_id: String::new(),
            duration_ms: 0.0,
            attempts: 0,
        }
    }

    /// Creates a business failure. Executors return this through `Ok` to
    /// report a failure that must not be retried or logged as an error.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            issues: None,
            trace_id: String::new(),
            duration_ms: 0.0,
            attempts: 0,
        }
    }

    /// Creates a validation failure carrying rendered issues.
    #[must_use]
    pub fn invalid(issues: &[ValidationIssue]) -> Self {
        Self {
            issues: Some(issues.iter().map(ValidationIssue::render).collect()),
            ..Self::failure(INVALID_INPUT_MESSAGE)
        }
    }

    /// Creates a failure from a classified error.
    #[must_use]
    pub fn from_error(error: &ActionError) -> Self {
        match error {
            ActionError::Validation { issues } => Self::invalid(issues),
            other => Self::failure(other.public_message()),
        }
    }

    /// Populates the envelope fields. Also guarantees a failed result carries
    /// a non-empty error and that issues are only present on failures.
    #[must_use]
    pub fn finalize(mut self, trace_id: impl Into<String>, duration_ms: f64, attempts: u32) -> Self {
        self.trace_id = trace_id.into();
        self.duration_ms = duration_ms.max(0.0);
        self.attempts = attempts;

        if self.success {
            self.issues = None;
        } else if self.error.as_deref().map_or(true, |e| e.trim().is_empty()) {
            self.error = Some(GENERIC_ERROR_MESSAGE.to_string());
        }
        self
    }

    /// Returns true if the action succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Returns true if the action failed.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        !self.success
    }

    /// Returns true if the failure came from input validation.
    #[must_use]
    pub fn is_invalid(&self) -> bool {
        self.issues.as_ref().is_some_and(|i| !i.is_empty())
    }

    /// Maps the payload, keeping the envelope.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ActionResult<U> {
        ActionResult {
            success: self.success,
            data: self.data.map(f),
            error: self.error,
            issues: self.issues,
            trace_id: self.trace_id,
            duration_ms: self.duration_ms,
            attempts: self.attempts,
        }
    }
}

impl<T: Serialize> ActionResult<T> {
    /// Converts the payload to JSON. A payload that fails to serialize turns
    /// the result into a failure.
    #[must_use]
    pub fn into_json(self) -> ActionResult<serde_json::Value> {
        let mut error = None;
        let json = self.map(|data| {
            serde_json::to_value(data).unwrap_or_else(|e| {
                error = Some(format!("Serialization error: {e}"));
                serde_json::Value::Null
            })
        });

        match error {
            Some(message) => ActionResult {
                success: false,
                data: None,
                error: Some(message),
                ..json
            },
            None => json,
        }
    }
}
