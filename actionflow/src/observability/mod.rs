//! Observability utilities.

mod subscriber;

pub use subscriber::{init_tracing, SpanTimer, TracingConfig, TracingFormat};
