//! Action context: caller-supplied params and metadata.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::cancellation::CancellationToken;

/// Open-ended parameters and metadata handed to an executor unmodified.
///
/// The runner never writes to `params` or `metadata`. The optional
/// cancellation token is cancelled by the runner when an attempt times out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionContext {
    /// Parameters for the executor.
    #[serde(default)]
    pub params: HashMap<String, serde_json::Value>,
    /// Caller metadata (request ids, user ids, and so on).
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    #[serde(skip)]
    cancellation: Option<Arc<CancellationToken>>,
}

impl ActionContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context from existing maps.
    #[must_use]
    pub fn from_parts(
        params: HashMap<String, serde_json::Value>,
        metadata: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            params,
            metadata,
            cancellation: None,
        }
    }

    /// Adds a parameter.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    /// Adds a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Attaches a cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: Arc<CancellationToken>) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Returns the attached cancellation token, if any.
    #[must_use]
    pub fn cancellation(&self) -> Option<&Arc<CancellationToken>> {
        self.cancellation.as_ref()
    }

    /// Returns true if an attached token has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.as_ref().is_some_and(|t| t.is_cancelled())
    }

    /// Gets a raw parameter.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&serde_json::Value> {
        self.params.get(key)
    }

    /// Gets a parameter deserialized into `T`. Returns `None` when the key is
    /// absent or has the wrong shape.
    #[must_use]
    pub fn param_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.params
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Gets a metadata value.
    #[must_use]
    pub fn metadata_value(&self, key: &str) -> Option<&serde_json::Value> {
        self.metadata.get(key)
    }
}
