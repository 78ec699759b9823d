//! Closure-backed actions.
//!
//! [`create_action_runner`] pairs an input shape with an async closure so an
//! action can be declared without a dedicated type.

use async_trait::async_trait;
use std::future::Future;
use std::marker::PhantomData;

use super::action::Action;
use super::config::RunnerConfig;
use super::pipeline::ActionRunner;
use crate::context::ActionContext;
use crate::core::ActionResult;
use crate::errors::ActionError;
use crate::validation::{InputShape, ValidationIssue};

/// An [`Action`] composed from an [`InputShape`] and an executor closure.
///
/// The closure receives owned copies of the validated input and the context
/// on every attempt.
pub struct FnAction<S, F, I, O> {
    name: String,
    shape: S,
    executor: F,
    _marker: PhantomData<fn(I) -> O>,
}

impl<S, F, I, O> FnAction<S, F, I, O> {
    /// Creates a new closure-backed action.
    pub fn new(name: impl Into<String>, shape: S, executor: F) -> Self {
        Self {
            name: name.into(),
            shape,
            executor,
            _marker: PhantomData,
        }
    }
}

impl<S, F, I, O> std::fmt::Debug for FnAction<S, F, I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnAction")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<S, F, Fut, I, O> Action for FnAction<S, F, I, O>
where
    S: InputShape<I>,
    F: Fn(I, ActionContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ActionResult<O>, ActionError>> + Send + 'static,
    I: Clone + Send + Sync + 'static,
    O: Send + 'static,
{
    type Input = I;
    type Output = O;

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self, raw: &serde_json::Value) -> Result<I, Vec<ValidationIssue>> {
        self.shape.parse(raw)
    }

    async fn execute(&self, input: &I, ctx: &ActionContext) -> Result<ActionResult<O>, ActionError> {
        (self.executor)(input.clone(), ctx.clone()).await
    }
}

/// Builds a runner from a name, an input shape and an executor closure.
///
/// ```ignore
/// let runner = create_action_runner(
///     "sma",
///     SerdeShape::<SmaInput>::new(),
///     |input, _ctx| async move { Ok(ActionResult::ok(sma(&input.prices, input.window))) },
///     RunnerConfig::default().with_timeout_ms(500),
/// );
/// ```
pub fn create_action_runner<S, F, Fut, I, O>(
    name: impl Into<String>,
    shape: S,
    executor: F,
    config: RunnerConfig,
) -> ActionRunner<FnAction<S, F, I, O>>
where
    S: InputShape<I>,
    F: Fn(I, ActionContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ActionResult<O>, ActionError>> + Send + 'static,
    I: Clone + Send + Sync + 'static,
    O: Send + 'static,
{
    ActionRunner::new(FnAction::new(name, shape, executor), config)
}
