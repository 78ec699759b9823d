//! Utility functions for trace id generation and timestamp handling.

pub mod timestamps;
mod trace_id;

pub use timestamps::{format_iso8601, iso_timestamp, now_utc, unix_millis, Timestamp};
pub use trace_id::{parse_trace_id, to_base36, TraceIdGenerator, TraceIdSource, UuidV7TraceIds};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_generator_is_shared() {
        let before = TraceIdGenerator::global().issued();
        let _ = TraceIdGenerator::global().generate();
        assert!(TraceIdGenerator::global().issued() > before);
    }

    #[test]
    fn test_iso_timestamp_format() {
        let ts = iso_timestamp();
        assert!(ts.contains('T'));
        assert!(ts.contains(':'));
    }
}
