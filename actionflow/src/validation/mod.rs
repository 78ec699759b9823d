//! Input validation for action runners.
//!
//! A shape turns untyped JSON input into a typed value, or into an ordered
//! list of [`ValidationIssue`]s. Validation is synchronous and never panics;
//! every failure is reported as data.

mod issue;
mod object;
mod shape;

pub use issue::{ValidationIssue, ROOT_PATH};
pub use object::{Field, FieldKind, ObjectRules, ObjectShape};
pub use shape::{shape_fn, FnShape, InputShape, SerdeShape};
