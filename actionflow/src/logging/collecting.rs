//! A logger that keeps entries in memory, for tests and diagnostics.

use parking_lot::RwLock;
use std::sync::Arc;

use super::{merge_metadata, LogEntry, LogLevel, LogMetadata, Logger};

/// Collects every entry. Children append to the same buffer.
#[derive(Debug, Clone, Default)]
pub struct CollectingLogger {
    entries: Arc<RwLock<Vec<LogEntry>>>,
    context: LogMetadata,
}

impl CollectingLogger {
    /// Creates a new collecting logger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected entries.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.read().clone()
    }

    /// Returns the messages of all collected entries, in order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.entries.read().iter().map(|e| e.message.clone()).collect()
    }

    /// Returns entries recorded at `level`.
    #[must_use]
    pub fn entries_at(&self, level: LogLevel) -> Vec<LogEntry> {
        self.entries
            .read()
            .iter()
            .filter(|e| e.level == level)
            .cloned()
            .collect()
    }

    /// Returns the number of collected entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Clears all collected entries.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl Logger for CollectingLogger {
    fn log(&self, level: LogLevel, message: &str, metadata: Option<&LogMetadata>) {
        let entry = LogEntry::new(level, message, &self.context, metadata);
        self.entries.write().push(entry);
    }

    fn derive_child(&self, context: &LogMetadata) -> Option<Arc<dyn Logger>> {
        Some(Arc::new(Self {
            entries: Arc::clone(&self.entries),
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
    fn test_collecting_logger() {
        let logger = CollectingLogger::new();
        assert!(logger.is_empty());

        logger.info("first", None);
        let shared: Arc<dyn Logger> = Arc::new(logger.clone());
        shared.child(metadata_from(json!({"traceId": "t"}))).warn("second", None);

        assert_eq!(logger.len(), 2);
        assert_eq!(logger.messages(), vec!["first", "second"]);

        let warnings = logger.entries_at(LogLevel::Warn);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].get("traceId"), Some(&json!("t")));
    }

    #[test]
    fn test_collecting_logger_clear() {
        let logger = CollectingLogger::new();
        logger.error("boom", None);
        logger.clear();
        assert!(logger.is_empty());
    }
}
