//! Test assertions for action results.

use crate::core::ActionResult;

/// Asserts that the result indicates success.
pub fn assert_result_succeeded<T>(result: &ActionResult<T>) {
    assert!(
        result.is_success(),
        "Expected success, got error: {:?}",
        result.error
    );
}

/// Asserts that the result indicates failure with a non-empty message.
pub fn assert_result_failed<T>(result: &ActionResult<T>) {
    assert!(result.is_failure(), "Expected failure, got success");
    assert!(
        result.error.as_deref().is_some_and(|e| !e.is_empty()),
        "Failed result must carry an error message"
    );
}

/// Asserts that the result failed validation with exactly `expected` issues.
pub fn assert_result_invalid<T>(result: &ActionResult<T>, expected: &[&str]) {
    assert_result_failed(result);
    let issues = result.issues.clone().unwrap_or_default();
    assert_eq!(
        issues, expected,
        "Expected issues {:?}, got {:?}",
        expected, issues
    );
}

/// Asserts that the failure message contains `needle`.
pub fn assert_error_contains<T>(result: &ActionResult<T>, needle: &str) {
    let error = result.error.as_deref().unwrap_or_default();
    assert!(
        error.contains(needle),
        "Expected error to contain '{}', got '{}'",
        needle,
        error
    );
}

/// Asserts that the envelope fields were populated.
pub fn assert_envelope<T>(result: &ActionResult<T>) {
    assert!(!result.trace_id.is_empty(), "Trace id must be set");
    assert!(
        result.duration_ms >= 0.0,
        "Duration must be non-negative, got {}",
        result.duration_ms
    );
    if result.is_failure() {
        assert!(
            result.error.as_deref().is_some_and(|e| !e.is_empty()),
            "Failed result must carry an error message"
        );
    } else {
        assert!(result.issues.is_none(), "Successful result must not carry issues");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationIssue;

    #[test]
    fn test_assertions_accept_matching_results() {
        let ok: ActionResult<u8> = ActionResult::ok(1).finalize("t", 1.0, 1);
        assert_result_succeeded(&ok);
        assert_envelope(&ok);

        let invalid: ActionResult<u8> =
            ActionResult::invalid(&[ValidationIssue::field("window", "Required")]).finalize("t", 0.0, 0);
        assert_result_invalid(&invalid, &["window: Required"]);
        assert_error_contains(&invalid, "Invalid input");
    }

    #[test]
    #[should_panic(expected = "Expected success")]
    fn test_succeeded_rejects_failure() {
        let failed: ActionResult<u8> = ActionResult::failure("no");
        assert_result_succeeded(&failed);
    }
}
