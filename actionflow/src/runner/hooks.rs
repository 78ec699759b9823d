//! Lifecycle hooks around a run.
//!
//! `on_before` fires at most once per run, only after input validated.
//! `on_after` fires exactly once per run, on every exit path, with the final
//! result.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::context::ActionContext;
use crate::core::ActionResult;
use crate::errors::HookError;

/// Observer of a run's lifecycle.
pub trait ActionHooks<I, O>: Send + Sync {
    /// Called with the validated input before the first attempt. Returning an
    /// error aborts the run.
    fn on_before(&self, _trace_id: &str, _input: &I, _ctx: &ActionContext) -> Result<(), HookError> {
        Ok(())
    }

    /// Called with the final result. Errors are logged and otherwise ignored.
    fn on_after(
        &self,
        _trace_id: &str,
        _result: &ActionResult<O>,
        _ctx: &ActionContext,
    ) -> Result<(), HookError> {
        Ok(())
    }
}

type BeforeFn<I> = Box<dyn Fn(&str, &I, &ActionContext) -> Result<(), HookError> + Send + Sync>;
type AfterFn<O> =
    Box<dyn Fn(&str, &ActionResult<O>, &ActionContext) -> Result<(), HookError> + Send + Sync>;

/// Closure-backed hooks.
pub struct FnHooks<I, O> {
    before: Option<BeforeFn<I>>,
    after: Option<AfterFn<O>>,
}

impl<I, O> FnHooks<I, O> {
    /// Creates hooks that do nothing.
    #[must_use]
    pub fn new() -> Self {
        Self {
            before: None,
            after: None,
        }
    }

    /// Sets the before hook.
    #[must_use]
    pub fn before<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &I, &ActionContext) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.before = Some(Box::new(f));
        self
    }

    /// Sets the after hook.
    #[must_use]
    pub fn after<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &ActionResult<O>, &ActionContext) -> Result<(), HookError>
            + Send
            + Sync
            + 'static,
    {
        self.after = Some(Box::new(f));
        self
    }
}

impl<I, O> Default for FnHooks<I, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, O> std::fmt::Debug for FnHooks<I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnHooks")
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .finish()
    }
}

impl<I, O> ActionHooks<I, O> for FnHooks<I, O> {
    fn on_before(&self, trace_id: &str, input: &I, ctx: &ActionContext) -> Result<(), HookError> {
        match &self.before {
            Some(f) => f(trace_id, input, ctx),
            None => Ok(()),
        }
    }

    fn on_after(
        &self,
        trace_id: &str,
        result: &ActionResult<O>,
        ctx: &ActionContext,
    ) -> Result<(), HookError> {
        match &self.after {
            Some(f) => f(trace_id, result, ctx),
            None => Ok(()),
        }
    }
}

/// Invokes optional hooks, converting panics into [`HookError`]s.
pub struct HookDispatcher<I, O> {
    hooks: Option<Arc<dyn ActionHooks<I, O>>>,
}

impl<I, O> HookDispatcher<I, O> {
    /// Creates a dispatcher with no hooks.
    #[must_use]
    pub fn none() -> Self {
        Self { hooks: None }
    }

    /// Creates a dispatcher for `hooks`.
    #[must_use]
    pub fn new(hooks: Arc<dyn ActionHooks<I, O>>) -> Self {
        Self { hooks: Some(hooks) }
    }

    /// Returns true if hooks are installed.
    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.hooks.is_some()
    }

    /// Runs the before hook, if any.
    pub fn before(&self, trace_id: &str, input: &I, ctx: &ActionContext) -> Result<(), HookError> {
        let Some(hooks) = &self.hooks else {
            return Ok(());
        };
        catch_unwind(AssertUnwindSafe(|| hooks.on_before(trace_id, input, ctx)))
            .unwrap_or_else(|panic| Err(HookError::new("before", panic_message(panic.as_ref()))))
    }

    /// Runs the after hook, if any.
    pub fn after(
        &self,
        trace_id: &str,
        result: &ActionResult<O>,
        ctx: &ActionContext,
    ) -> Result<(), HookError> {
        let Some(hooks) = &self.hooks else {
            return Ok(());
        };
        catch_unwind(AssertUnwindSafe(|| hooks.on_after(trace_id, result, ctx)))
            .unwrap_or_else(|panic| Err(HookError::new("after", panic_message(panic.as_ref()))))
    }
}

impl<I, O> Default for HookDispatcher<I, O> {
    fn default() -> Self {
        Self::none()
    }
}

impl<I, O> std::fmt::Debug for HookDispatcher<I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookDispatcher")
            .field("installed", &self.is_installed())
            .finish()
    }
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
