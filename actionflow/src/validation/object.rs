//! Declarative object shapes that report every field issue at once.

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;

use super::shape::deserialize_tracked;
use super::{InputShape, ValidationIssue};

/// The JSON type a field must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Any value.
    Any,
    /// A JSON string.
    String,
    /// Any JSON number.
    Number,
    /// A JSON number without a fractional part.
    Integer,
    /// A JSON boolean.
    Boolean,
    /// A JSON array.
    Array,
    /// A JSON object.
    Object,
}

impl FieldKind {
    fn matches(self, value: &Value) -> bool {
        match self {
            Self::Any => true,
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Clone)]
enum Rule {
    MinLength(usize),
    MaxLength(usize),
    Min(f64),
    Max(f64),
    OneOf(Vec<String>),
    Pattern { regex: Regex, message: String },
    Nested(ObjectRules),
}

/// A single field declaration.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    kind: FieldKind,
    required: bool,
    rules: Vec<Rule>,
}

impl Field {
    fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            rules: Vec::new(),
        }
    }

    /// Declares a field of any type.
    #[must_use]
    pub fn any(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Any)
    }

    /// Declares a string field.
    #[must_use]
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::String)
    }

    /// Declares a number field.
    #[must_use]
    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Number)
    }

    /// Declares an integer field.
    #[must_use]
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    /// Declares a boolean field.
    #[must_use]
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    /// Declares an array field.
    #[must_use]
    pub fn array(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Array)
    }

    /// Declares a nested object field validated by `rules`.
    #[must_use]
    pub fn object(name: impl Into<String>, rules: ObjectRules) -> Self {
        let mut field = Self::new(name, FieldKind::Object);
        field.rules.push(Rule::Nested(rules));
        field
    }

    /// Allows the field to be absent or null.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Minimum length for strings (characters) and arrays (elements).
    #[must_use]
    pub fn min_length(mut self, len: usize) -> Self {
        self.rules.push(Rule::MinLength(len));
        self
    }

    /// Maximum length for strings (characters) and arrays (elements).
    #[must_use]
    pub fn max_length(mut self, len: usize) -> Self {
        self.rules.push(Rule::MaxLength(len));
        self
    }

    /// Inclusive lower bound for numbers.
    #[must_use]
    pub fn min(mut self, bound: f64) -> Self {
        self.rules.push(Rule::Min(bound));
        self
    }

    /// Inclusive upper bound for numbers.
    #[must_use]
    pub fn max(mut self, bound: f64) -> Self {
        self.rules.push(Rule::Max(bound));
        self
    }

    /// Requires a number greater than or equal to zero.
    #[must_use]
    pub fn non_negative(self) -> Self {
        self.min(0.0)
    }

    /// Restricts a string to one of the given values.
    #[must_use]
    pub fn one_of<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules
            .push(Rule::OneOf(values.into_iter().map(Into::into).collect()));
        self
    }

    /// Requires a string to match `regex`, reporting `message` otherwise.
    #[must_use]
    pub fn pattern(mut self, regex: Regex, message: impl Into<String>) -> Self {
        self.rules.push(Rule::Pattern {
            regex,
            message: message.into(),
        });
        self
    }

    fn check(&self, value: Option<&Value>, path: &[String], issues: &mut Vec<ValidationIssue>) {
        let mut field_path = path.to_vec();
        field_path.push(self.name.clone());

        let value = match value {
            None | Some(Value::Null) => {
                if self.required {
                    issues.push(ValidationIssue::new(field_path, "Required"));
                }
                return;
            }
            Some(value) => value,
        };

        if !self.kind.matches(value) {
            issues.push(ValidationIssue::new(
                field_path,
                format!("Expected {}, received {}", self.kind.label(), type_name(value)),
            ));
            return;
        }

        for rule in &self.rules {
            if let Some(message) = apply_rule(rule, value, &field_path, issues) {
                issues.push(ValidationIssue::new(field_path.clone(), message));
            }
        }
    }
}

fn length_of(value: &Value) -> Option<(usize, &'static str)> {
    match value {
        Value::String(s) => Some((s.chars().count(), "character(s)")),
        Value::Array(items) => Some((items.len(), "element(s)")),
        _ => None,
    }
}

fn apply_rule(
    rule: &Rule,
    value: &Value,
    path: &[String],
    issues: &mut Vec<ValidationIssue>,
) -> Option<String> {
    match rule {
        Rule::MinLength(min) => length_of(value)
            .filter(|(len, _)| len < min)
            .map(|(_, unit)| format!("Must contain at least {min} {unit}")),
        Rule::MaxLength(max) => length_of(value)
            .filter(|(len, _)| len > max)
            .map(|(_, unit)| format!("Must contain at most {max} {unit}")),
        Rule::Min(bound) => value
            .as_f64()
            .filter(|n| n < bound)
            .map(|_| format!("Number must be greater than or equal to {bound}")),
        Rule::Max(bound) => value
            .as_f64()
            .filter(|n| n > bound)
            .map(|_| format!("Number must be less than or equal to {bound}")),
        Rule::OneOf(allowed) => value.as_str().and_then(|s| {
            if allowed.iter().any(|a| a == s) {
                None
            } else {
                let expected = allowed
                    .iter()
                    .map(|a| format!("'{a}'"))
                    .collect::<Vec<_>>()
                    .join(" | ");
                Some(format!("Invalid enum value. Expected {expected}, received '{s}'"))
            }
        }),
        Rule::Pattern { regex, message } => value
            .as_str()
            .filter(|s| !regex.is_match(s))
            .map(|_| message.clone()),
        Rule::Nested(rules) => {
            rules.check_at(value, path, issues);
            None
        }
    }
}

/// An ordered set of field declarations for a JSON object.
#[derive(Debug, Clone, Default)]
pub struct ObjectRules {
    fields: Vec<Field>,
    strict: bool,
}

impl ObjectRules {
    /// Creates an empty rule set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field declaration.
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Rejects keys that are not declared.
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Validates `value` and returns every issue found, in declaration order.
    #[must_use]
    pub fn check(&self, value: &Value) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        self.check_at(value, &[], &mut issues);
        issues
    }

    fn check_at(&self, value: &Value, path: &[String], issues: &mut Vec<ValidationIssue>) {
        let Some(object) = value.as_object() else {
            issues.push(ValidationIssue::new(
                path.to_vec(),
                format!("Expected object, received {}", type_name(value)),
            ));
            return;
        };

        for field in &self.fields {
            field.check(object.get(&field.name), path, issues);
        }

        if self.strict {
            for key in object.keys() {
                if !self.fields.iter().any(|f| &f.name == key) {
                    let mut key_path = path.to_vec();
                    key_path.push(key.clone());
                    issues.push(ValidationIssue::new(key_path, "Unrecognized key"));
                }
            }
        }
    }
}

/// An object shape: declarative rules first, then deserialization into `T`.
#[derive(Debug, Clone)]
pub struct ObjectShape<T> {
    rules: ObjectRules,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ObjectShape<T> {
    /// Creates a shape with no declared fields.
    #[must_use]
    pub fn new() -> Self {
        Self::from_rules(ObjectRules::new())
    }

    /// Creates a shape from an existing rule set.
    #[must_use]
    pub fn from_rules(rules: ObjectRules) -> Self {
        Self {
            rules,
            _marker: PhantomData,
        }
    }

    /// Adds a field declaration.
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.rules = self.rules.field(field);
        self
    }

    /// Rejects keys that are not declared.
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.rules = self.rules.strict();
        self
    }
}

impl<T> Default for ObjectShape<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned> InputShape<T> for ObjectShape<T> {
    fn parse(&self, raw: &Value) -> Result<T, Vec<ValidationIssue>> {
        let issues = self.rules.check(raw);
        if !issues.is_empty() {
            return Err(issues);
        }
        deserialize_tracked(raw)
    }
}
