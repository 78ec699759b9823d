//! Action runner: validation, timeout, retry and hooks around an executor.
//!
//! Build a runner once with [`ActionRunner::new`] (or
//! [`create_action_runner`] for closure-backed actions) and call
//! [`ActionRunner::run`] per request.

mod action;
mod config;
mod factory;
mod hooks;
mod integration_tests;
mod pipeline;
mod retry;
mod timeout;

pub use action::Action;
pub use config::RunnerConfig;
pub use factory::{create_action_runner, FnAction};
pub use hooks::{ActionHooks, FnHooks, HookDispatcher};
pub use pipeline::{ActionRunner, HOOK_FAILED_CODE, INVALID_INPUT_CODE, PANIC_CODE};
pub use retry::{RetryDecision, RetryPolicy};
pub use timeout::{run_with_timeout, TimedResult};
