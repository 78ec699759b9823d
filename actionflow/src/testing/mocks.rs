//! Mock actions and hooks for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::context::ActionContext;
use crate::core::ActionResult;
use crate::errors::{ActionError, HookError};
use crate::runner::{Action, ActionHooks};
use crate::validation::{ObjectRules, ValidationIssue};

/// One scripted attempt outcome.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Return a successful result with this payload.
    Ok(serde_json::Value),
    /// Return a business failure.
    Failure(String),
    /// Return a classified error.
    Err(ActionError),
    /// Panic with this message.
    Panic(String),
}

/// An action that replays a script of outcomes, one per attempt.
///
/// When the script runs out, the last outcome repeats; an empty script
/// succeeds with no data. Input is accepted as-is unless rules are attached.
#[derive(Debug)]
pub struct ScriptedAction {
    name: String,
    rules: Option<ObjectRules>,
    script: Mutex<VecDeque<Outcome>>,
    last: Mutex<Option<Outcome>>,
    calls: AtomicUsize,
}

impl ScriptedAction {
    /// Creates an action with an empty script.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: None,
            script: Mutex::new(VecDeque::new()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// Validates input against `rules` before it reaches the script.
    #[must_use]
    pub fn with_rules(mut self, rules: ObjectRules) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Appends an outcome.
    #[must_use]
    pub fn then(self, outcome: Outcome) -> Self {
        self.script.lock().push_back(outcome);
        self
    }

    /// Appends a success.
    #[must_use]
    pub fn then_ok(self, data: serde_json::Value) -> Self {
        self.then(Outcome::Ok(data))
    }

    /// Appends a business failure.
    #[must_use]
    pub fn then_failure(self, message: impl Into<String>) -> Self {
        self.then(Outcome::Failure(message.into()))
    }

    /// Appends an error.
    #[must_use]
    pub fn then_err(self, error: ActionError) -> Self {
        self.then(Outcome::Err(error))
    }

    /// Appends a panic.
    #[must_use]
    pub fn then_panic(self, message: impl Into<String>) -> Self {
        self.then(Outcome::Panic(message.into()))
    }

    /// Returns how many times `execute` was called.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_outcome(&self) -> Option<Outcome> {
        let next = self.script.lock().pop_front();
        let mut last = self.last.lock();
        if let Some(outcome) = next {
            *last = Some(outcome);
        }
        last.clone()
    }
}

#[async_trait]
impl Action for ScriptedAction {
    type Input = serde_json::Value;
    type Output = serde_json::Value;

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self, raw: &serde_json::Value) -> Result<Self::Input, Vec<ValidationIssue>> {
        match &self.rules {
            Some(rules) => {
                let issues = rules.check(raw);
                if issues.is_empty() {
                    Ok(raw.clone())
                } else {
                    Err(issues)
                }
            }
            None => Ok(raw.clone()),
        }
    }

    async fn execute(
        &self,
        _input: &Self::Input,
        _ctx: &ActionContext,
    ) -> Result<ActionResult<Self::Output>, ActionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.next_outcome() {
            None => Ok(ActionResult::ok_empty()),
            Some(Outcome::Ok(data)) => Ok(ActionResult::ok(data)),
            Some(Outcome::Failure(message)) => Ok(ActionResult::failure(message)),
            Some(Outcome::Err(error)) => Err(error),
            Some(Outcome::Panic(message)) => panic!("{message}"),
        }
    }
}

/// An action that sleeps before succeeding.
///
/// Records whether any attempt ran to completion, which lets tests observe
/// that a timed-out attempt was abandoned.
#[derive(Debug)]
pub struct SlowAction {
    name: String,
    delay: Duration,
    calls: AtomicUsize,
    completed: Arc<AtomicBool>,
}

impl SlowAction {
    /// Creates an action that takes `delay` per attempt.
    #[must_use]
    pub fn new(name: impl Into<String>, delay: Duration) -> Self {
        Self {
            name: name.into(),
            delay,
            calls: AtomicUsize::new(0),
            completed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns how many times `execute` was called.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Returns a flag set once an attempt finishes sleeping.
    #[must_use]
    pub fn completed(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.completed)
    }
}

#[async_trait]
impl Action for SlowAction {
    type Input = serde_json::Value;
    type Output = serde_json::Value;

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self, raw: &serde_json::Value) -> Result<Self::Input, Vec<ValidationIssue>> {
        Ok(raw.clone())
    }

    async fn execute(
        &self,
        input: &Self::Input,
        _ctx: &ActionContext,
    ) -> Result<ActionResult<Self::Output>, ActionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.completed.store(true, Ordering::SeqCst);
        Ok(ActionResult::ok(input.clone()))
    }
}

/// A hook invocation seen by [`RecordingHooks`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookCall {
    /// `on_before` ran for this trace id.
    Before(String),
    /// `on_after` ran for this trace id, with the result's success flag.
    After {
        /// Trace id of the run.
        trace_id: String,
        /// Whether the final result succeeded.
        success: bool,
    },
}

/// Hooks that record every invocation, optionally failing on demand.
#[derive(Debug, Default)]
pub struct RecordingHooks {
    calls: Mutex<Vec<HookCall>>,
    fail_before: Option<String>,
    fail_after: Option<String>,
}

impl RecordingHooks {
    /// Creates hooks that always succeed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `on_before` fail with `message`.
    #[must_use]
    pub fn failing_before(mut self, message: impl Into<String>) -> Self {
        self.fail_before = Some(message.into());
        self
    }

    /// Makes `on_after` fail with `message`.
    #[must_use]
    pub fn failing_after(mut self, message: impl Into<String>) -> Self {
        self.fail_after = Some(message.into());
        self
    }

    /// Returns all recorded calls in order.
    #[must_use]
    pub fn calls(&self) -> Vec<HookCall> {
        self.calls.lock().clone()
    }

    /// Returns the number of `on_before` calls.
    #[must_use]
    pub fn before_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, HookCall::Before(_)))
            .count()
    }

    /// Returns the number of `on_after` calls.
    #[must_use]
    pub fn after_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, HookCall::After { .. }))
            .count()
    }
}

impl<I, O> ActionHooks<I, O> for RecordingHooks {
    fn on_before(&self, trace_id: &str, _input: &I, _ctx: &ActionContext) -> Result<(), HookError> {
        self.calls.lock().push(HookCall::Before(trace_id.to_string()));
        match &self.fail_before {
            Some(message) => Err(HookError::new("before", message.clone())),
            None => Ok(()),
        }
    }

    fn on_after(
        &self,
        trace_id: &str,
        result: &ActionResult<O>,
        _ctx: &ActionContext,
    ) -> Result<(), HookError> {
        self.calls.lock().push(HookCall::After {
            trace_id: trace_id.to_string(),
            success: result.success,
        });
        match &self.fail_after {
            Some(message) => Err(HookError::new("after", message.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_scripted_action_replays_and_repeats() {
        let action = ScriptedAction::new("s")
            .then_err(ActionError::retryable("busy"))
            .then_ok(json!(1));
        let ctx = ActionContext::new();

        assert!(action.execute(&json!({}), &ctx).await.is_err());
        assert_eq!(action.execute(&json!({}), &ctx).await.unwrap().data, Some(json!(1)));
        assert_eq!(action.execute(&json!({}), &ctx).await.unwrap().data, Some(json!(1)));
        assert_eq!(action.call_count(), 3);
    }

    #[tokio::test]
    async fn test_empty_script_succeeds() {
        let action = ScriptedAction::new("s");
        let result = action.execute(&json!(null), &ActionContext::new()).await.unwrap();
        assert!(result.success);
        assert!(result.data.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_action_completes() {
        let action = SlowAction::new("slow", Duration::from_millis(20));
        let result = action.execute(&json!(3), &ActionContext::new()).await.unwrap();
        assert_eq!(result.data, Some(json!(3)));
        assert!(action.completed().load(Ordering::SeqCst));
    }

    #[test]
    fn test_recording_hooks() {
        let hooks = RecordingHooks::new().failing_after("nope");
        let ctx = ActionContext::new();

        assert!(ActionHooks::<u8, u8>::on_before(&hooks, "t", &1, &ctx).is_ok());
        assert!(ActionHooks::<u8, u8>::on_after(&hooks, "t", &ActionResult::ok(1), &ctx).is_err());
        assert_eq!(
            hooks.calls(),
            vec![
                HookCall::Before("t".to_string()),
                HookCall::After {
                    trace_id: "t".to_string(),
                    success: true
                },
            ]
        );
    }
}
