//! End-to-end tests for the run state machine.

#[cfg(test)]
mod tests {
    use crate::cancellation::CancellationToken;
    use crate::context::ActionContext;
    use crate::core::ActionResult;
    use crate::errors::{ActionError, GENERIC_ERROR_MESSAGE};
    use crate::logging::LogLevel;
    use crate::runner::{
        create_action_runner, ActionRunner, RunnerConfig, HOOK_FAILED_CODE, INVALID_INPUT_CODE,
    };
    use crate::testing::{
        assert_envelope, assert_error_contains, assert_result_failed, assert_result_invalid,
        assert_result_succeeded, CollectingLogger, HookCall, RecordingHooks, ScriptedAction,
        SlowAction,
    };
    use crate::utils::parse_trace_id;
    use crate::validation::{shape_fn, Field, ObjectRules, ValidationIssue};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn quiet<A: crate::runner::Action>(runner: ActionRunner<A>) -> (ActionRunner<A>, CollectingLogger) {
        let logger = CollectingLogger::new();
        (runner.with_logger(Arc::new(logger.clone())), logger)
    }

    #[tokio::test]
    async fn test_timeout_fails_with_configured_deadline() {
        let action = SlowAction::new("slow", Duration::from_millis(200));
        let completed = action.completed();
        let (runner, logger) = quiet(ActionRunner::new(
            action,
            RunnerConfig::default().with_timeout_ms(50),
        ));

        let token = Arc::new(CancellationToken::new());
        let ctx = ActionContext::new().with_cancellation(token.clone());
        let result = runner.run(&json!({}), &ctx).await;

        assert_result_failed(&result);
        assert_error_contains(&result, "50");
        assert_eq!(result.error.as_deref(), Some("execution timed out after 50ms"));
        assert_eq!(result.attempts, 1);
        assert!(result.duration_ms >= 50.0);
        assert!(token.is_cancelled());

        let failed = logger.entries_at(LogLevel::Error);
        assert_eq!(failed[0].get("error_code"), Some(&json!("TIMEOUT")));
        assert_eq!(failed[0].get("state"), Some(&json!("timed_out")));

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(!completed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_timeout_is_not_retried() {
        let (runner, _logger) = quiet(ActionRunner::new(
            SlowAction::new("slow", Duration::from_millis(200)),
            RunnerConfig::default().with_timeout_ms(20).with_retries(3),
        ));

        let result = runner.run(&json!({}), &ActionContext::new()).await;

        assert_result_failed(&result);
        assert_eq!(runner.action().call_count(), 1);
    }

    #[tokio::test]
    async fn test_retry_then_success_waits_linear_backoff() {
        let action = ScriptedAction::new("quote")
            .then_err(ActionError::retryable("rate limited"))
            .then_err(ActionError::retryable("rate limited"))
            .then_ok(json!({"price": 101.5}));
        let (runner, logger) = quiet(ActionRunner::new(
            action,
            RunnerConfig::default().with_retries(2).with_retry_backoff_ms(10),
        ));

        let started = Instant::now();
        let result = runner.run(&json!({}), &ActionContext::new()).await;
        let elapsed = started.elapsed();

        assert_result_succeeded(&result);
        assert_eq!(result.data, Some(json!({"price": 101.5})));
        assert_eq!(result.attempts, 3);
        assert_eq!(runner.action().call_count(), 3);
        assert!(elapsed >= Duration::from_millis(30));
        assert!(result.duration_ms >= 30.0);

        let delays: Vec<_> = logger
            .entries_at(LogLevel::Warn)
            .iter()
            .filter(|e| e.message == "retrying action")
            .filter_map(|e| e.get("delayMs").cloned())
            .collect();
        assert_eq!(delays, vec![json!(10), json!(20)]);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let action = ScriptedAction::new("quote").then_err(ActionError::retryable("upstream busy"));
        let (runner, _logger) = quiet(ActionRunner::new(
            action,
            RunnerConfig::default().with_retries(2),
        ));

        let result = runner.run(&json!({}), &ActionContext::new()).await;

        assert_result_failed(&result);
        assert_eq!(result.error.as_deref(), Some("upstream busy"));
        assert_eq!(runner.action().call_count(), 3);
        assert_eq!(result.attempts, 3);
    }

    #[tokio::test]
    async fn test_zero_retries_is_single_attempt() {
        let action = ScriptedAction::new("quote").then_err(ActionError::retryable("busy"));
        let (runner, _logger) = quiet(ActionRunner::new(action, RunnerConfig::default()));

        runner.run(&json!({}), &ActionContext::new()).await;
        assert_eq!(runner.action().call_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_field_short_circuits() {
        let action = ScriptedAction::new("vault")
            .with_rules(ObjectRules::new().field(Field::string("vaultId")));
        let hooks = Arc::new(RecordingHooks::new());
        let (runner, logger) = quiet(
            ActionRunner::new(action, RunnerConfig::default()).with_hooks(hooks.clone()),
        );

        let result = runner.run(&json!({}), &ActionContext::new()).await;

        assert_result_invalid(&result, &["vaultId: Required"]);
        assert_eq!(result.error.as_deref(), Some("Invalid input"));
        assert_eq!(result.attempts, 0);
        assert_envelope(&result);
        assert_eq!(runner.action().call_count(), 0);
        assert_eq!(hooks.before_count(), 0);
        assert_eq!(hooks.after_count(), 1);
        assert_eq!(logger.messages(), vec!["validation failed"]);
    }

    #[tokio::test]
    async fn test_fatal_error_is_not_retried() {
        let action = ScriptedAction::new("swap").then_err(ActionError::fatal("bad mint address"));
        let (runner, _logger) = quiet(ActionRunner::new(
            action,
            RunnerConfig::default().with_retries(3).with_retry_backoff_ms(5),
        ));

        let result = runner.run(&json!({}), &ActionContext::new()).await;

        assert_result_failed(&result);
        assert_eq!(result.error.as_deref(), Some("bad mint address"));
        assert_eq!(runner.action().call_count(), 1);
        assert_eq!(result.attempts, 1);
    }

    #[tokio::test]
    async fn test_concurrent_runs_get_distinct_trace_ids() {
        let (runner, _logger) = quiet(ActionRunner::new(
            SlowAction::new("slow", Duration::from_millis(5)),
            RunnerConfig::default(),
        ));
        let ctx = ActionContext::new();
        let (first, second) = (json!(1), json!(2));

        let (a, b) = tokio::join!(runner.run(&first, &ctx), runner.run(&second, &ctx));

        assert_ne!(a.trace_id, b.trace_id);
        assert!(parse_trace_id(&a.trace_id).is_some());
        assert!(parse_trace_id(&b.trace_id).is_some());
    }

    #[tokio::test]
    async fn test_hooks_fire_exactly_once() {
        let hooks = Arc::new(RecordingHooks::new());
        let action = ScriptedAction::new("quote")
            .then_err(ActionError::retryable("busy"))
            .then_ok(json!(1));
        let (runner, _logger) = quiet(
            ActionRunner::new(action, RunnerConfig::default().with_retries(1))
                .with_hooks(hooks.clone()),
        );

        let result = runner.run(&json!({}), &ActionContext::new()).await;

        assert_eq!(
            hooks.calls(),
            vec![
                HookCall::Before(result.trace_id.clone()),
                HookCall::After {
                    trace_id: result.trace_id.clone(),
                    success: true,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_failing_before_hook_skips_executor() {
        let hooks = Arc::new(RecordingHooks::new().failing_before("wallet locked"));
        let (runner, logger) = quiet(
            ActionRunner::new(ScriptedAction::new("swap"), RunnerConfig::default())
                .with_hooks(hooks.clone()),
        );

        let result = runner.run(&json!({}), &ActionContext::new()).await;

        assert_result_failed(&result);
        assert_eq!(result.error.as_deref(), Some("before hook failed: wallet locked"));
        assert_eq!(result.attempts, 0);
        assert_eq!(runner.action().call_count(), 0);
        assert_eq!(hooks.after_count(), 1);

        let failed = logger.entries_at(LogLevel::Error);
        assert_eq!(failed[0].get("error_code"), Some(&json!(HOOK_FAILED_CODE)));
    }

    #[tokio::test]
    async fn test_failing_after_hook_keeps_result() {
        let hooks = Arc::new(RecordingHooks::new().failing_after("audit sink down"));
        let (runner, logger) = quiet(
            ActionRunner::new(
                ScriptedAction::new("quote").then_ok(json!(7)),
                RunnerConfig::default(),
            )
            .with_hooks(hooks),
        );

        let result = runner.run(&json!({}), &ActionContext::new()).await;

        assert_result_succeeded(&result);
        assert_eq!(result.data, Some(json!(7)));
        let errors = logger.entries_at(LogLevel::Error);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "after hook failed");
        assert_eq!(
            errors[0].get("error"),
            Some(&json!("after hook failed: audit sink down"))
        );
    }

    #[tokio::test]
    async fn test_panicking_executor_becomes_failure() {
        let hooks = Arc::new(RecordingHooks::new());
        let (runner, _logger) = quiet(
            ActionRunner::new(
                ScriptedAction::new("sma").then_panic("index out of range"),
                RunnerConfig::default().with_retries(2),
            )
            .with_hooks(hooks.clone()),
        );

        let result = runner.run(&json!({}), &ActionContext::new()).await;

        assert_result_failed(&result);
        assert_eq!(
            result.error.as_deref(),
            Some("executor panicked: index out of range")
        );
        assert_eq!(runner.action().call_count(), 1);
        assert_eq!(hooks.after_count(), 1);
    }

    #[tokio::test]
    async fn test_business_failure_is_returned_as_is() {
        let (runner, logger) = quiet(ActionRunner::new(
            ScriptedAction::new("swap").then_failure(""),
            RunnerConfig::default().with_retries(3),
        ));

        let result = runner.run(&json!({}), &ActionContext::new()).await;

        assert_result_failed(&result);
        assert_eq!(result.error.as_deref(), Some(GENERIC_ERROR_MESSAGE));
        assert!(result.issues.is_none());
        assert_eq!(runner.action().call_count(), 1);
        assert!(logger.entries_at(LogLevel::Error).is_empty());
        assert_envelope(&result);
    }

    #[tokio::test]
    async fn test_business_failure_is_logged_as_such() {
        let (runner, logger) = quiet(ActionRunner::new(
            ScriptedAction::new("swap").then_failure("slippage exceeded"),
            RunnerConfig::default(),
        ));

        runner.run(&json!({}), &ActionContext::new()).await;

        let completed = &logger.entries_at(LogLevel::Info)[1];
        assert_eq!(completed.message, "action completed");
        assert_eq!(completed.get("success"), Some(&json!(false)));
        assert_eq!(completed.get("state"), Some(&json!("business_failure")));
    }

    #[tokio::test]
    async fn test_executor_validation_error_carries_no_issues() {
        let action = ScriptedAction::new("vault").then_err(ActionError::validation(vec![
            ValidationIssue::field("amount", "Must be positive"),
        ]));
        let (runner, logger) = quiet(ActionRunner::new(
            action,
            RunnerConfig::default().with_retries(2),
        ));

        let result = runner.run(&json!({}), &ActionContext::new()).await;

        assert_result_failed(&result);
        assert!(result.issues.is_none());
        assert!(!result.is_invalid());
        assert_eq!(
            result.error.as_deref(),
            Some("Invalid input: amount: Must be positive")
        );
        assert_eq!(result.attempts, 1);

        let failed = logger.entries_at(LogLevel::Error);
        assert_eq!(failed[0].get("error_name"), Some(&json!("FatalFailure")));
        assert_eq!(failed[0].get("error_code"), Some(&json!(INVALID_INPUT_CODE)));
    }

    #[tokio::test]
    async fn test_executor_result_issues_are_stripped() {
        let (runner, _logger) = quiet(create_action_runner(
            "vault",
            shape_fn(|raw: &serde_json::Value| Ok(raw.clone())),
            |_input: serde_json::Value, _ctx| async move {
                Ok(ActionResult::<()>::invalid(&[ValidationIssue::field("owner", "Unknown")]))
            },
            RunnerConfig::default(),
        ));

        let result = runner.run(&json!({}), &ActionContext::new()).await;

        assert_result_failed(&result);
        assert_eq!(result.error.as_deref(), Some("Invalid input"));
        assert!(result.issues.is_none());
        assert_eq!(result.attempts, 1);
    }

    #[tokio::test]
    async fn test_empty_rejection_still_reports_an_issue() {
        let (runner, _logger) = quiet(create_action_runner(
            "vault",
            shape_fn(|_: &serde_json::Value| Err::<serde_json::Value, _>(Vec::new())),
            |input: serde_json::Value, _ctx| async move { Ok(ActionResult::ok(input)) },
            RunnerConfig::default(),
        ));

        let result = runner.run(&json!({}), &ActionContext::new()).await;

        assert_result_invalid(&result, &["(root): Invalid input"]);
        assert!(result.is_invalid());
        assert_eq!(result.attempts, 0);
    }

    #[tokio::test]
    async fn test_envelope_overrides_executor_fields() {
        let action = ScriptedAction::new("quote").then_ok(json!(null));
        let (runner, _logger) = quiet(ActionRunner::new(action, RunnerConfig::default()));

        let result = runner.run(&json!({}), &ActionContext::new()).await;

        assert_envelope(&result);
        assert!(parse_trace_id(&result.trace_id).is_some());
        assert_eq!(result.attempts, 1);
    }

    #[test]
    fn test_run_from_blocking_code() {
        let (runner, _logger) = quiet(ActionRunner::new(
            ScriptedAction::new("quote").then_ok(json!("ok")),
            RunnerConfig::default(),
        ));

        let result = tokio_test::block_on(runner.run(&json!({}), &ActionContext::new()));
        assert_eq!(result.data, Some(json!("ok")));
    }
}
