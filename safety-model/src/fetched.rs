use serde::Deserialize;
use serde::Serialize;

use crate::counters::UNAVAILABLE_COUNT;

/// A single asynchronously-resolved field of a data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fetched<T> {
    /// Never resolved.
    Pending,
    /// Resolved, but the fetch failed or reported the sentinel.
    Unavailable,
    Value(T),
}

impl<T> Default for Fetched<T> {
    fn default() -> Self {
        Fetched::Pending
    }
}

impl<T> Fetched<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Fetched::Pending)
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Fetched::Unavailable)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Fetched::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Marks the field unavailable after a failed fetch.
    pub fn invalidate(&mut self) {
        *self = Fetched::Unavailable;
    }
}

impl Fetched<u32> {
    /// Decodes a persisted counter. Negative values are the "never fetched"
    /// sentinel and stay distinct from a real zero.
    pub fn from_count(raw: i64) -> Self {
        if raw < 0 {
            Fetched::Unavailable
        } else {
            Fetched::Value(u32::try_from(raw).unwrap_or(u32::MAX))
        }
    }

    pub fn to_count(&self) -> i64 {
        match self {
            Fetched::Value(n) => i64::from(*n),
            Fetched::Pending | Fetched::Unavailable => UNAVAILABLE_COUNT,
        }
    }

    /// The count when it is known and non-zero.
    pub fn positive(&self) -> Option<u32> {
        match self {
            Fetched::Value(n) if *n > 0 => Some(*n),
            _ => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Fetched::Value(0))
    }
}
