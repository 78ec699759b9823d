//! The caller-owned context passed through to executors.

mod action_context;

pub use action_context::ActionContext;
