//! The execution pipeline.
//!
//! A run moves through validation, the before hook, a bounded
//! execute/backoff loop and the after hook. Every exit path produces a
//! finalized [`ActionResult`]; `run` never returns an error and never
//! propagates a panic from the action or its hooks.

use futures::FutureExt;
use serde_json::json;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use super::action::Action;
use super::config::RunnerConfig;
use super::hooks::{panic_message, ActionHooks, HookDispatcher};
use super::retry::RetryDecision;
use super::timeout::run_with_timeout;
use crate::context::ActionContext;
use crate::core::{ActionResult, RunState, INVALID_INPUT_MESSAGE};
use crate::errors::ActionError;
use crate::logging::{default_logger, metadata_from, LogMetadata, Logger, LoggerExt};
use crate::observability::SpanTimer;
use crate::utils::{TraceIdGenerator, TraceIdSource};
use crate::validation::ValidationIssue;

/// Code attached to failures caused by a panicking executor.
pub const PANIC_CODE: &str = "PANIC";

/// Code attached to failures caused by the before hook.
pub const HOOK_FAILED_CODE: &str = "HOOK_FAILED";

/// Code attached to validation errors raised by an executor.
pub const INVALID_INPUT_CODE: &str = "INVALID_INPUT";

/// Runs an [`Action`] under validation, timeout, retry and logging.
///
/// A runner is built once and reused; each call to [`run`](Self::run) is
/// independent and may execute concurrently with others.
pub struct ActionRunner<A: Action> {
    action: A,
    config: RunnerConfig,
    logger: Arc<dyn Logger>,
    hooks: HookDispatcher<A::Input, A::Output>,
    trace_ids: Option<Arc<dyn TraceIdSource>>,
}

impl<A: Action> ActionRunner<A> {
    /// Creates a runner. An empty `config.name` is replaced by the action's
    /// name.
    #[must_use]
    pub fn new(action: A, mut config: RunnerConfig) -> Self {
        if config.name.trim().is_empty() {
            config.name = action.name().to_string();
        }
        Self {
            action,
            config,
            logger: default_logger(),
            hooks: HookDispatcher::none(),
            trace_ids: None,
        }
    }

    /// Replaces the logger.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Installs lifecycle hooks.
    #[must_use]
    pub fn with_hooks(mut self, hooks: Arc<dyn ActionHooks<A::Input, A::Output>>) -> Self {
        self.hooks = HookDispatcher::new(hooks);
        self
    }

    /// Replaces the process-wide trace id generator for this runner.
    #[must_use]
    pub fn with_trace_ids(mut self, source: Arc<dyn TraceIdSource>) -> Self {
        self.trace_ids = Some(source);
        self
    }

    /// Returns the name used in logs.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Returns the wrapped action.
    #[must_use]
    pub fn action(&self) -> &A {
        &self.action
    }

    fn next_trace_id(&self) -> String {
        match &self.trace_ids {
            Some(source) => source.next_id(),
            None => TraceIdGenerator::global().generate(),
        }
    }

    /// Validates `raw`, executes the action and returns the normalized
    /// result.
    pub async fn run(&self, raw: &serde_json::Value, ctx: &ActionContext) -> ActionResult<A::Output> {
        let timer = SpanTimer::start(self.config.name.clone());
        let trace_id = self.next_trace_id();
        let log = self.logger.child(metadata_from(json!({
            "action": self.config.name,
            "traceId": trace_id,
        })));

        let input = match self.validate(raw) {
            Ok(input) => input,
            Err(issues) => {
                let result =
                    ActionResult::invalid(&issues).finalize(&trace_id, timer.elapsed_ms(), 0);
                log.warn(
                    "validation failed",
                    Some(&metadata_from(json!({
                        "issues": result.issues,
                        "state": RunState::Invalid.to_string(),
                    }))),
                );
                self.after(&trace_id, &result, ctx, log.as_ref());
                return result;
            }
        };

        log.info(
            "action started",
            Some(&metadata_from(json!({
                "timeoutMs": self.config.timeout_ms,
                "retries": self.config.retries,
            }))),
        );

        if let Err(err) = self.hooks.before(&trace_id, &input, ctx) {
            let error = ActionError::fatal(err.to_string()).with_code(HOOK_FAILED_CODE);
            return self.fail(&error, 0, &trace_id, &timer, ctx, log.as_ref());
        }

        let policy = self.config.retry_policy();
        let deadline = self.config.timeout();
        let mut attempts = 0_u32;

        loop {
            attempts = attempts.saturating_add(1);

            let error = match self.attempt(&input, ctx, deadline).await {
                Ok(result) => {
                    let result = result.finalize(&trace_id, timer.elapsed_ms(), attempts);
                    let state = if result.success {
                        RunState::Success
                    } else {
                        RunState::BusinessFailure
                    };
                    log.info(
                        "action completed",
                        Some(&metadata_from(json!({
                            "success": result.success,
                            "attempts": attempts,
                            "durationMs": result.duration_ms,
                            "state": state.to_string(),
                        }))),
                    );
                    self.after(&trace_id, &result, ctx, log.as_ref());
                    return result;
                }
                Err(error) => error,
            };

            match policy.decide(&error, attempts) {
                RetryDecision::Retry(delay) => {
                    let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
                    log.warn(
                        "retrying action",
                        Some(&metadata_from(json!({
                            "attempt": attempts,
                            "delayMs": delay_ms,
                            "error": error.public_message(),
                            "state": RunState::Backoff.to_string(),
                        }))),
                    );
                    tracing::debug!(
                        action = %self.config.name,
                        attempt = attempts,
                        delay_ms,
                        "Retrying after retryable failure"
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                RetryDecision::GiveUp | RetryDecision::NotRetryable => {
                    return self.fail(&error, attempts, &trace_id, &timer, ctx, log.as_ref());
                }
            }
        }
    }

    /// Validates `raw`. A rejection always carries at least one issue.
    fn validate(&self, raw: &serde_json::Value) -> Result<A::Input, Vec<ValidationIssue>> {
        catch_unwind(AssertUnwindSafe(|| self.action.validate(raw)))
            .unwrap_or_else(|panic| {
                Err(vec![ValidationIssue::root(format!(
                    "validator panicked: {}",
                    panic_message(panic.as_ref())
                ))])
            })
            .map_err(|issues| {
                if issues.is_empty() {
                    vec![ValidationIssue::root(INVALID_INPUT_MESSAGE)]
                } else {
                    issues
                }
            })
    }

    /// Runs one attempt. Panics become fatal errors; an expired deadline
    /// becomes a timeout error and cancels the context token.
    ///
    /// Issues are reserved for the input validation step, so they are
    /// stripped from executor results and executor validation errors become
    /// fatal.
    async fn attempt(
        &self,
        input: &A::Input,
        ctx: &ActionContext,
        deadline: Option<Duration>,
    ) -> Result<ActionResult<A::Output>, ActionError> {
        let guarded = async {
            match AssertUnwindSafe(self.action.execute(input, ctx))
                .catch_unwind()
                .await
            {
                Ok(outcome) => outcome,
                Err(panic) => Err(ActionError::fatal(format!(
                    "executor panicked: {}",
                    panic_message(panic.as_ref())
                ))
                .with_code(PANIC_CODE)),
            }
        };

        run_with_timeout(deadline, guarded)
            .await
            .into_result(|elapsed| {
                let timeout_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
                let error = ActionError::timeout(timeout_ms);
                if let Some(token) = ctx.cancellation() {
                    token.cancel(error.to_string());
                }
                error
            })
            .map(|mut result| {
                result.issues = None;
                result
            })
            .map_err(|error| match error {
                ActionError::Validation { .. } => {
                    ActionError::fatal(error.to_string()).with_code(INVALID_INPUT_CODE)
                }
                other => other,
            })
    }

    fn fail(
        &self,
        error: &ActionError,
        attempts: u32,
        trace_id: &str,
        timer: &SpanTimer,
        ctx: &ActionContext,
        log: &dyn Logger,
    ) -> ActionResult<A::Output> {
        let result = ActionResult::from_error(error).finalize(trace_id, timer.elapsed_ms(), attempts);
        let state = if error.is_timeout() {
            RunState::TimedOut
        } else {
            RunState::FatalFailure
        };

        let mut metadata: LogMetadata = error.to_dict().into_iter().collect();
        metadata.insert("attempts".to_string(), json!(attempts));
        metadata.insert("durationMs".to_string(), json!(result.duration_ms));
        metadata.insert("state".to_string(), json!(state.to_string()));
        log.error("action failed", Some(&metadata));

        self.after(trace_id, &result, ctx, log);
        result
    }

    fn after(&self, trace_id: &str, result: &ActionResult<A::Output>, ctx: &ActionContext, log: &dyn Logger) {
        if let Err(err) = self.hooks.after(trace_id, result, ctx) {
            log.error(
                "after hook failed",
                Some(&metadata_from(json!({ "error": err.to_string() }))),
            );
        }
    }
}

impl<A> ActionRunner<A>
where
    A: Action,
    A::Output: serde::Serialize,
{
    /// Like [`run`](Self::run), with the payload converted to JSON.
    pub async fn run_json(
        &self,
        raw: &serde_json::Value,
        ctx: &ActionContext,
    ) -> ActionResult<serde_json::Value> {
        self.run(raw, ctx).await.into_json()
    }
}

impl<A: Action> std::fmt::Debug for ActionRunner<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRunner")
            .field("name", &self.config.name)
            .field("config", &self.config)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}
