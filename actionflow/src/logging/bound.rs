//! Context binding for backends without native child support.

use std::sync::Arc;

use super::{merge_metadata, LogLevel, LogMetadata, Logger};

/// Forwards to a parent logger with extra context merged into each call.
///
/// Nested children flatten into one wrapper around the original parent.
pub struct ContextLogger {
    parent: Arc<dyn Logger>,
    context: LogMetadata,
}

impl ContextLogger {
    /// Binds `context` to `parent`.
    #[must_use]
    pub fn new(parent: Arc<dyn Logger>, context: LogMetadata) -> Self {
        Self { parent, context }
    }

    /// Returns the bound context.
    #[must_use]
    pub fn context(&self) -> &LogMetadata {
        &self.context
    }
}

impl std::fmt::Debug for ContextLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextLogger")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl Logger for ContextLogger {
    fn log(&self, level: LogLevel, message: &str, metadata: Option<&LogMetadata>) {
        let merged = merge_metadata(&self.context, metadata);
        self.parent.log(level, message, Some(&merged));
    }

    fn derive_child(&self, context: &LogMetadata) -> Option<Arc<dyn Logger>> {
        Some(Arc::new(Self {
            parent: Arc::clone(&self.parent),
            context: merge_metadata(&self.context, Some(context)),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{metadata_from, CollectingLogger};
    use serde_json::json;

    #[test]
    fn test_call_metadata_wins() {
        let sink = CollectingLogger::new();
        let bound = ContextLogger::new(
            Arc::new(sink.clone()),
            metadata_from(json!({"action": "scan", "attempt": 1})),
        );

        bound.info("action started", Some(&metadata_from(json!({"attempt": 2}))));

        let entry = &sink.entries()[0];
        assert_eq!(entry.get("action"), Some(&json!("scan")));
        assert_eq!(entry.get("attempt"), Some(&json!(2)));
    }

    #[test]
    fn test_nested_children_flatten() {
        let sink = CollectingLogger::new();
        let bound = ContextLogger::new(Arc::new(sink.clone()), metadata_from(json!({"a": 1})));
        let nested = bound.derive_child(&metadata_from(json!({"b": 2}))).unwrap();

        nested.error("x", None);

        let entry = &sink.entries()[0];
        assert_eq!(entry.get("a"), Some(&json!(1)));
        assert_eq!(entry.get("b"), Some(&json!(2)));
    }
}
