//! # Actionflow
//!
//! A runtime for executing discrete actions under a uniform contract.
//!
//! Every run of an action goes through the same harness:
//!
//! - **Validation**: untyped JSON input is checked against a declared shape
//! - **Timeouts**: each attempt is bounded by an optional deadline
//! - **Retries**: retryable failures are re-attempted with linear backoff
//! - **Structured logging**: every entry is correlated by a per-run trace id
//! - **Normalized results**: callers always receive an [`ActionResult`], never a panic
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use actionflow::prelude::*;
//!
//! let runner = create_action_runner(
//!     "sma",
//!     SerdeShape::<SmaInput>::new(),
//!     |input, _ctx| async move { Ok(ActionResult::ok(sma(&input.prices, input.window))) },
//!     RunnerConfig::default().with_timeout_ms(500).with_retries(2),
//! );
//!
//! let result = runner.run(&raw_input, &ActionContext::new()).await;
//! ```
//!
//! [`ActionResult`]: core::ActionResult

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cancellation;
pub mod context;
pub mod core;
pub mod errors;
pub mod logging;
pub mod observability;
pub mod runner;
pub mod testing;
pub mod utils;
pub mod validation;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancellation::CancellationToken;
    pub use crate::context::ActionContext;
    pub use crate::core::{ActionResult, RunState};
    pub use crate::errors::{ActionError, ConfigError, HookError};
    pub use crate::logging::{
        ConsoleLogger, LogLevel, LogMetadata, Logger, LoggerExt, NoOpLogger, TracingLogger,
    };
    pub use crate::observability::{init_tracing, TracingConfig};
    pub use crate::runner::{
        create_action_runner, Action, ActionHooks, ActionRunner, FnHooks, RunnerConfig,
    };
    pub use crate::utils::{iso_timestamp, TraceIdGenerator, TraceIdSource};
    pub use crate::validation::{
        shape_fn, Field, InputShape, ObjectRules, ObjectShape, SerdeShape, ValidationIssue,
    };
}
