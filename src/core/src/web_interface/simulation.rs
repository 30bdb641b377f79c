//! Load shapes for the demo endpoints: artificial latency, memory churn and
//! failure injection. Kept free of HTTP types so the decisions can be tested
//! directly.

use chrono::Utc;

/// Parses a positive integer from a query value, falling back to `default`
/// when the value is absent, unparsable or zero.
pub fn positive_or_default(raw: Option<&str>, default: u64) -> u64 {
    match raw.map(str::trim).and_then(|s| s.parse::<u64>().ok()) {
        Some(0) | None => default,
        Some(value) => value,
    }
}

/// One element of the memory-churn array.
#[derive(Debug, Clone)]
pub struct ChurnRecord {
    pub id: usize,
    pub data: String,
    pub timestamp: String,
}

/// Builds `size` records of ~100 bytes payload each.
pub fn allocate_records(size: usize) -> Vec<ChurnRecord> {
    (0..size)
        .map(|id| ChurnRecord {
            id,
            data: "x".repeat(100),
            timestamp: Utc::now().to_rfc3339(),
        })
        .collect()
}

/// Heap and inline bytes held by `records`.
pub fn approximate_bytes(records: &[ChurnRecord]) -> usize {
    let inline = records.len() * std::mem::size_of::<ChurnRecord>();
    let heap: usize = records
        .iter()
        .map(|r| r.data.capacity() + r.timestamp.capacity())
        .sum();
    inline + heap
}

/// What `/api/random-error` does for a given roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RandomOutcome {
    /// Escapes the handler as an unhandled fault (30%)
    Fault,
    /// 404 "Resource not found" (20%)
    NotFound,
    /// 500 "Internal server error" (20%)
    ServerError,
    /// 200 (30%)
    Success,
}

/// Maps a roll in `[0, 1)` onto an outcome.
pub fn random_outcome(roll: f64) -> RandomOutcome {
    if roll < 0.3 {
        RandomOutcome::Fault
    } else if roll < 0.5 {
        RandomOutcome::NotFound
    } else if roll < 0.7 {
        RandomOutcome::ServerError
    } else {
        RandomOutcome::Success
    }
}
