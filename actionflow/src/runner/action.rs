//! The action registration contract.

use async_trait::async_trait;

use crate::context::ActionContext;
use crate::core::ActionResult;
use crate::errors::ActionError;
use crate::validation::ValidationIssue;

/// A named unit of work with a declared input shape.
///
/// The runner calls [`validate`](Action::validate) once per run and
/// [`execute`](Action::execute) once per attempt. `execute` may be invoked
/// several times with the same input when it fails with
/// [`ActionError::Retryable`].
#[async_trait]
pub trait Action: Send + Sync {
    /// Validated input type.
    type Input: Send + Sync + 'static;
    /// Payload carried by successful results.
    type Output: Send + 'static;

    /// Returns the action name.
    fn name(&self) -> &str;

    /// Converts untyped input into [`Self::Input`].
    fn validate(&self, raw: &serde_json::Value) -> Result<Self::Input, Vec<ValidationIssue>>;

    /// Performs one attempt.
    ///
    /// Return `Ok` with a failed [`ActionResult`] for business failures that
    /// must not be retried; return `Err` for classified errors.
    async fn execute(
        &self,
        input: &Self::Input,
        ctx: &ActionContext,
    ) -> Result<ActionResult<Self::Output>, ActionError>;
}
