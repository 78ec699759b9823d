//! The default console logger: one JSON record per line.

use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;

use super::{LogEntry, LogLevel, LogMetadata, Logger};

type Sink = Arc<Mutex<Box<dyn Write + Send>>>;

/// Writes each entry as a single JSON line to a shared sink.
///
/// Children share the parent's sink, so lines from concurrent runs never
/// interleave mid-record.
#[derive(Clone)]
pub struct ConsoleLogger {
    sink: Sink,
    context: LogMetadata,
    min_level: LogLevel,
}

impl std::fmt::Debug for ConsoleLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleLogger")
            .field("context", &self.context)
            .field("min_level", &self.min_level)
            .finish_non_exhaustive()
    }
}

impl ConsoleLogger {
    /// Creates a logger writing to `writer`.
    #[must_use]
    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(writer))),
            context: LogMetadata::new(),
            min_level: LogLevel::Debug,
        }
    }

    /// Creates a logger writing to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::with_writer(std::io::stdout())
    }

    /// Creates a logger writing to standard error.
    #[must_use]
    pub fn stderr() -> Self {
        Self::with_writer(std::io::stderr())
    }

    /// Drops entries below `level`.
    #[must_use]
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Returns the bound context.
    #[must_use]
    pub fn context(&self) -> &LogMetadata {
        &self.context
    }
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::stdout()
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, level: LogLevel, message: &str, metadata: Option<&LogMetadata>) {
        if level < self.min_level {
            return;
        }

        let line = LogEntry::new(level, message, &self.context, metadata).to_json_line();
        let mut sink = self.sink.lock();
        if let Err(e) = writeln!(sink, "{line}").and_then(|()| sink.flush()) {
            tracing::debug!(error = %e, "Failed to write log entry");
        }
    }

    fn derive_child(&self, context: &LogMetadata) -> Option<Arc<dyn Logger>> {
        Some(Arc::new(Self {
            sink: Arc::clone(&self.sink),
            context: super::merge_metadata(&self.context, Some(context)),
            min_level: self.min_level,
        }))
    }
}
