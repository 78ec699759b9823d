//! Cooperative cancellation for executors.
//!
//! A runner cannot forcibly stop work an executor has handed to other tasks.
//! Callers attach a [`CancellationToken`] to the action context; the runner
//! cancels it when an attempt times out and executors may observe it.

mod token;

pub use token::CancellationToken;
