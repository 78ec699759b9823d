//! Correlation (trace) id generation.
//!
//! Ids combine a millisecond timestamp with a sequence number, both rendered
//! in base 36: `<millis>-<sequence>`. The sequence is atomic, so concurrent
//! runs sharing a generator never observe the same id.

use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

use super::timestamps::unix_millis;

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A source of trace ids.
pub trait TraceIdSource: Send + Sync {
    /// Returns a fresh id.
    fn next_id(&self) -> String;
}

/// Time-ordered generator backed by an atomic sequence counter.
#[derive(Debug, Default)]
pub struct TraceIdGenerator {
    sequence: AtomicU64,
}

static GLOBAL: TraceIdGenerator = TraceIdGenerator::new();

impl TraceIdGenerator {
    /// Creates a generator whose sequence starts at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sequence: AtomicU64::new(0),
        }
    }

    /// Returns the process-wide generator.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Generates the next id.
    pub fn generate(&self) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", to_base36(unix_millis()), to_base36(seq))
    }

    /// Returns how many ids this generator has issued.
    #[must_use]
    pub fn issued(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

impl TraceIdSource for TraceIdGenerator {
    fn next_id(&self) -> String {
        self.generate()
    }
}

/// Trace ids backed by UUIDv7, for hosts that need ids unique across
/// processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV7TraceIds;

impl TraceIdSource for UuidV7TraceIds {
    fn next_id(&self) -> String {
        Uuid::now_v7().to_string()
    }
}

/// Encodes a number in lowercase base 36.
#[must_use]
pub fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while value > 0 {
        digits.push(ALPHABET[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Splits a generated id back into its `(millis, sequence)` parts.
///
/// Returns `None` if the id was not produced by [`TraceIdGenerator`].
#[must_use]
pub fn parse_trace_id(id: &str) -> Option<(u64, u64)> {
    let (millis, seq) = id.split_once('-')?;
    Some((
        u64::from_str_radix(millis, 36).ok()?,
        u64::from_str_radix(seq, 36).ok()?,
    ))
}
