//! Structured, leveled logging with child-context composition.
//!
//! [`Logger`] is the one interface a host application implements to plug in
//! its own backend; only [`Logger::log`] is required. Any shared logger can
//! derive a child bound to extra context through [`LoggerExt::child`];
//! entries from the child merge that context first, then per-call metadata,
//! with per-call keys winning on conflict.

mod bound;
mod collecting;
mod console;
mod entry;
mod tracing_logger;

use std::sync::Arc;

pub use bound::ContextLogger;
pub use collecting::CollectingLogger;
pub use console::ConsoleLogger;
pub use entry::{merge_metadata, metadata_from, LogEntry, LogLevel, LogMetadata};
pub use tracing_logger::TracingLogger;

/// A leveled, contextual logger. Implementations must be safe to share
/// across concurrent runs.
pub trait Logger: Send + Sync {
    /// Records a message at `level`.
    fn log(&self, level: LogLevel, message: &str, metadata: Option<&LogMetadata>);

    /// Derives a logger bound to additional context natively. Backends
    /// without native support keep the default, and children are built by
    /// wrapping them in a [`ContextLogger`].
    fn derive_child(&self, _context: &LogMetadata) -> Option<Arc<dyn Logger>> {
        None
    }

    /// Records a debug message.
    fn debug(&self, message: &str, metadata: Option<&LogMetadata>) {
        self.log(LogLevel::Debug, message, metadata);
    }

    /// Records an info message.
    fn info(&self, message: &str, metadata: Option<&LogMetadata>) {
        self.log(LogLevel::Info, message, metadata);
    }

    /// Records a warning.
    fn warn(&self, message: &str, metadata: Option<&LogMetadata>) {
        self.log(LogLevel::Warn, message, metadata);
    }

    /// Records an error.
    fn error(&self, message: &str, metadata: Option<&LogMetadata>) {
        self.log(LogLevel::Error, message, metadata);
    }
}

/// Child derivation for shared loggers.
pub trait LoggerExt {
    /// Derives a logger bound to additional fixed context.
    fn child(&self, context: LogMetadata) -> Arc<dyn Logger>;
}

impl LoggerExt for Arc<dyn Logger> {
    fn child(&self, context: LogMetadata) -> Arc<dyn Logger> {
        self.derive_child(&context)
            .unwrap_or_else(|| Arc::new(ContextLogger::new(Arc::clone(self), context)))
    }
}

/// A logger that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLogger;

impl Logger for NoOpLogger {
    fn log(&self, _level: LogLevel, _message: &str, _metadata: Option<&LogMetadata>) {
        // Intentionally empty - discards all entries
    }

    fn derive_child(&self, _context: &LogMetadata) -> Option<Arc<dyn Logger>> {
        Some(Arc::new(Self))
    }
}

/// Returns the built-in default logger (JSON lines on stdout).
#[must_use]
pub fn default_logger() -> Arc<dyn Logger> {
    Arc::new(ConsoleLogger::stdout())
}
