//! Core domain model types for actionflow.
//!
//! This module contains:
//! - The normalized result envelope returned by every run
//! - The run state machine's states

mod result;
mod status;

pub use result::{ActionResult, INVALID_INPUT_MESSAGE};
pub use status::RunState;
