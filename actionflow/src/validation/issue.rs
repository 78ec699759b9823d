//! Field-level validation issues.

use serde::{Deserialize, Serialize};

/// Marker rendered in place of an empty field path.
pub const ROOT_PATH: &str = "(root)";

/// A single problem found while validating input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Path segments from the root of the input to the offending field.
    pub path: Vec<String>,
    /// Human-readable description of the problem.
    pub message: String,
}

impl ValidationIssue {
    /// Creates a new issue.
    #[must_use]
    pub fn new(path: Vec<String>, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }

    /// Creates an issue that applies to the whole input.
    #[must_use]
    pub fn root(message: impl Into<String>) -> Self {
        Self::new(Vec::new(), message)
    }

    /// Creates an issue for a single top-level field.
    #[must_use]
    pub fn field(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![name.into()], message)
    }

    /// Returns the dot-joined path, or [`ROOT_PATH`] when empty.
    #[must_use]
    pub fn path_string(&self) -> String {
        if self.path.is_empty() {
            ROOT_PATH.to_string()
        } else {
            self.path.join(".")
        }
    }

    /// Renders the issue as `"path: message"`.
    #[must_use]
    pub fn render(&self) -> String {
        format!("{}: {}", self.path_string(), self.message)
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path_string(), self.message)
    }
}
