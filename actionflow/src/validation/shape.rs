//! The input shape contract and its serde-backed implementations.

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_path_to_error::Segment;
use std::marker::PhantomData;
use std::sync::OnceLock;

use super::ValidationIssue;

/// Converts untyped input into a typed value or a list of issues.
///
/// Implementations must be deterministic and must not panic.
pub trait InputShape<T>: Send + Sync {
    /// Parses raw input.
    fn parse(&self, raw: &serde_json::Value) -> Result<T, Vec<ValidationIssue>>;
}

/// A shape that relies entirely on `T`'s `Deserialize` implementation.
///
/// Serde stops at the first problem, so this yields at most one issue. Use
/// [`super::ObjectShape`] to collect every field issue.
#[derive(Debug)]
pub struct SerdeShape<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> SerdeShape<T> {
    /// Creates a new serde shape.
    #[must_use]
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for SerdeShape<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned> InputShape<T> for SerdeShape<T> {
    fn parse(&self, raw: &serde_json::Value) -> Result<T, Vec<ValidationIssue>> {
        deserialize_tracked(raw)
    }
}

fn field_error_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^(missing|unknown) field `([^`]+)`").ok())
        .as_ref()
}

/// Deserializes `raw` into `T`, reporting the first failure at the path
/// where serde hit it.
pub(crate) fn deserialize_tracked<T: DeserializeOwned>(
    raw: &serde_json::Value,
) -> Result<T, Vec<ValidationIssue>> {
    serde_path_to_error::deserialize(raw).map_err(|e| vec![issue_from_serde(&e)])
}

/// Maps a tracked serde error to an issue. Missing and unknown keys are
/// reported under the key itself with the standard messages.
fn issue_from_serde(
    err: &serde_path_to_error::Error<serde_json::Error>,
) -> ValidationIssue {
    let mut path: Vec<String> = err
        .path()
        .iter()
        .filter_map(|segment| match segment {
            Segment::Seq { index } => Some(index.to_string()),
            Segment::Map { key } => Some(key.clone()),
            Segment::Enum { variant } => Some(variant.clone()),
            Segment::Unknown => None,
        })
        .collect();
    let message = err.inner().to_string();

    let Some(caps) = field_error_pattern().and_then(|re| re.captures(&message)) else {
        return ValidationIssue::new(path, message);
    };

    let field = caps[2].to_string();
    // serde reports a missing key at its parent but may already have
    // descended into an unknown one.
    if path.last() != Some(&field) {
        path.push(field);
    }
    match &caps[1] {
        "missing" => ValidationIssue::new(path, "Required"),
        _ => ValidationIssue::new(path, "Unrecognized key"),
    }
}

/// A shape backed by an arbitrary validation closure.
pub struct FnShape<F, T> {
    validator: F,
    _marker: PhantomData<fn() -> T>,
}

impl<F, T> std::fmt::Debug for FnShape<F, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnShape").finish_non_exhaustive()
    }
}

impl<F, T> InputShape<T> for FnShape<F, T>
where
    F: Fn(&serde_json::Value) -> Result<T, Vec<ValidationIssue>> + Send + Sync,
{
    fn parse(&self, raw: &serde_json::Value) -> Result<T, Vec<ValidationIssue>> {
        (self.validator)(raw)
    }
}

/// Wraps a closure as an [`InputShape`].
pub fn shape_fn<T, F>(validator: F) -> FnShape<F, T>
where
    F: Fn(&serde_json::Value) -> Result<T, Vec<ValidationIssue>> + Send + Sync,
{
    FnShape {
        validator,
        _marker: PhantomData,
    }
}
