//! Testing utilities for actions.
//!
//! This module provides:
//! - Scripted and slow mock actions
//! - Recording hooks
//! - Assertions over result envelopes

mod assertions;
mod mocks;

pub use crate::logging::CollectingLogger;
pub use assertions::{
    assert_envelope, assert_error_contains, assert_result_failed, assert_result_invalid,
    assert_result_succeeded,
};
pub use mocks::{HookCall, Outcome, RecordingHooks, ScriptedAction, SlowAction};
