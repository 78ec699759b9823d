//! Per-attempt deadline enforcement.
//!
//! The deadline timer lives inside [`tokio::time::timeout`] and is dropped as
//! soon as the race resolves, so no timers outlive an attempt. When the
//! deadline wins, the in-flight future is dropped, which stops it at its next
//! await point. Work it spawned onto other tasks keeps running.

use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

/// Result of a timed operation.
#[derive(Debug)]
pub enum TimedResult<T, E> {
    /// Operation completed successfully.
    Ok(T),
    /// Operation failed with an error.
    Err(E),
    /// Operation did not finish before the deadline.
    Timeout(Duration),
}

impl<T, E> TimedResult<T, E> {
    /// Returns true if the operation succeeded.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, TimedResult::Ok(_))
    }

    /// Returns true if the operation failed.
    #[must_use]
    pub fn is_err(&self) -> bool {
        matches!(self, TimedResult::Err(_))
    }

    /// Returns true if the operation timed out.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, TimedResult::Timeout(_))
    }

    /// Converts to a standard Result, mapping a timeout through `on_timeout`.
    pub fn into_result(self, on_timeout: impl FnOnce(Duration) -> E) -> Result<T, E> {
        match self {
            TimedResult::Ok(v) => Ok(v),
            TimedResult::Err(e) => Err(e),
            TimedResult::Timeout(d) => Err(on_timeout(d)),
        }
    }
}

/// Awaits `future`, racing it against `deadline` when one is given.
pub async fn run_with_timeout<T, E, F>(deadline: Option<Duration>, future: F) -> TimedResult<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    let outcome = match deadline {
        Some(duration) => match timeout(duration, future).await {
            Ok(outcome) => outcome,
            Err(_) => return TimedResult::Timeout(duration),
        },
        None => future.await,
    };

    match outcome {
        Ok(value) => TimedResult::Ok(value),
        Err(error) => TimedResult::Err(error),
    }
}
