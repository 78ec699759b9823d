//! A logger that forwards entries to the `tracing` ecosystem.

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::{merge_metadata, LogLevel, LogMetadata, Logger};

/// Emits every entry as a `tracing` event at the matching level, with the
/// merged metadata rendered as a JSON field.
///
/// Pair with [`crate::observability::init_tracing`] to route runner logs
/// through the host's subscriber.
#[derive(Debug, Clone, Default)]
pub struct TracingLogger {
    context: LogMetadata,
}

impl TracingLogger {
    /// Creates a logger with no bound context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str, metadata: Option<&LogMetadata>) {
        let merged = merge_metadata(&self.context, metadata);
        let fields = serde_json::Value::Object(merged);

        match level {
            LogLevel::Debug => debug!(metadata = %fields, "{}", message),
            LogLevel::Info => info!(metadata = %fields, "{}", message),
            LogLevel::Warn => warn!(metadata = %fields, "{}", message),
            LogLevel::Error => error!(metadata = %fields, "{}", message),
        }
    }

    fn derive_child(&self, context: &LogMetadata) -> Option<Arc<dyn Logger>> {
        Some(Arc::new(Self {
            context: merge_metadata(&self.context, Some(context)),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{metadata_from, LoggerExt};
    use serde_json::json;

    #[test]
    fn test_tracing_logger() {
        let logger: Arc<dyn Logger> = Arc::new(TracingLogger::new());
        logger.info("action started", Some(&metadata_from(json!({"traceId": "x"}))));
        let child = logger.child(metadata_from(json!({"action": "scan"})));
        child.error("action failed", None);
        // Should not panic without a subscriber installed
    }
}
