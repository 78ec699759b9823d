//! Log levels, metadata and entries.

use serde::{Deserialize, Serialize};

use crate::utils::iso_timestamp;

/// Structured metadata attached to a log entry.
pub type LogMetadata = serde_json::Map<String, serde_json::Value>;

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Verbose diagnostics.
    Debug,
    /// Normal lifecycle events.
    #[default]
    Info,
    /// Recoverable problems.
    Warn,
    /// Failures.
    Error,
}

impl LogLevel {
    /// Returns the lowercase level name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds metadata from a JSON value.
///
/// Objects are used as-is; any other value is stored under `"value"`.
#[must_use]
pub fn metadata_from(value: serde_json::Value) -> LogMetadata {
    match value {
        serde_json::Value::Object(map) => map,
        serde_json::Value::Null => LogMetadata::new(),
        other => {
            let mut map = LogMetadata::new();
            map.insert("value".to_string(), other);
            map
        }
    }
}

/// Overlays `overlay` on top of `base`. Keys in `overlay` win.
#[must_use]
pub fn merge_metadata(base: &LogMetadata, overlay: Option<&LogMetadata>) -> LogMetadata {
    let mut merged = base.clone();
    if let Some(overlay) = overlay {
        for (key, value) in overlay {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// A single rendered log record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Severity.
    pub level: LogLevel,
    /// ISO 8601 timestamp.
    pub timestamp: String,
    /// The log message.
    pub message: String,
    /// Bound context merged with call-site metadata.
    pub metadata: LogMetadata,
}

impl LogEntry {
    /// Creates an entry stamped with the current time.
    #[must_use]
    pub fn new(
        level: LogLevel,
        message: impl Into<String>,
        bound: &LogMetadata,
        call: Option<&LogMetadata>,
    ) -> Self {
        Self {
            level,
            timestamp: iso_timestamp(),
            message: message.into(),
            metadata: merge_metadata(bound, call),
        }
    }

    /// Returns a metadata value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.metadata.get(key)
    }

    /// Renders the entry as a flat JSON object. The `level`, `timestamp` and
    /// `message` keys take precedence over metadata keys of the same name.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let mut record = self.metadata.clone();
        record.insert("level".to_string(), serde_json::json!(self.level));
        record.insert("timestamp".to_string(), serde_json::json!(self.timestamp));
        record.insert("message".to_string(), serde_json::json!(self.message));
        serde_json::Value::Object(record)
    }

    /// Renders the entry as a single line of JSON.
    #[must_use]
    pub fn to_json_line(&self) -> String {
        self.to_json().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Warn < LogLevel::Error);
        assert_eq!(LogLevel::Warn.to_string(), "warn");
    }

    #[test]
    fn test_call_metadata_wins() {
        let bound = metadata_from(json!({"action": "balance", "traceId": "a"}));
        let call = metadata_from(json!({"traceId": "b", "attempt": 2}));

        let merged = merge_metadata(&bound, Some(&call));
        assert_eq!(merged.get("action"), Some(&json!("balance")));
        assert_eq!(merged.get("traceId"), Some(&json!("b")));
        assert_eq!(merged.get("attempt"), Some(&json!(2)));
    }

    #[test]
    fn test_metadata_from_scalar() {
        assert_eq!(metadata_from(json!(5)).get("value"), Some(&json!(5)));
        assert!(metadata_from(serde_json::Value::Null).is_empty());
    }

    #[test]
    fn test_json_line_reserved_keys_win() {
        let bound = metadata_from(json!({"message": "shadowed", "action": "x"}));
        let entry = LogEntry::new(LogLevel::Info, "action started", &bound, None);

        let record: serde_json::Value = serde_json::from_str(&entry.to_json_line()).unwrap();
        assert_eq!(record["level"], "info");
        assert_eq!(record["message"], "action started");
        assert_eq!(record["action"], "x");
        assert!(record["timestamp"].as_str().unwrap().ends_with('Z'));
    }
}
