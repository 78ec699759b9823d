//! States of the run state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A state of a single `run` invocation.
///
/// ```text
/// Validating -> Invalid
/// Validating -> Executing -> Success
///                         -> BusinessFailure
///                         -> Backoff -> Executing (bounded)
///                         -> FatalFailure
///                         -> TimedOut
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Raw input is being validated.
    Validating,
    /// Validation failed.
    Invalid,
    /// An attempt is in flight.
    Executing,
    /// Waiting before the next attempt.
    Backoff,
    /// The executor returned a successful result.
    Success,
    /// The executor returned a failed result. Never retried.
    BusinessFailure,
    /// The executor failed and will not be retried.
    FatalFailure,
    /// An attempt exceeded its deadline.
    TimedOut,
}

impl RunState {
    /// Returns true if the run ends in this state.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Invalid | Self::Success | Self::BusinessFailure | Self::FatalFailure | Self::TimedOut
        )
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validating => write!(f, "validating"),
            Self::Invalid => write!(f, "invalid"),
            Self::Executing => write!(f, "executing"),
            Self::Backoff => write!(f, "backoff"),
            Self::Success => write!(f, "success"),
            Self::BusinessFailure => write!(f, "business_failure"),
            Self::FatalFailure => write!(f, "fatal_failure"),
            Self::TimedOut => write!(f, "timed_out"),
        }
    }
}
