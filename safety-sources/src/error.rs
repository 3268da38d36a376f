use crate::checker::CheckDomain;

/// Errors reported by a [`SecurityChecker`](crate::SecurityChecker).
///
/// These never escape a data source: a failed fetch marks the affected fields
/// unavailable and persists the sentinel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckerError {
    #[error("checker unreachable: {0}")]
    Unreachable(String),

    #[error("{domain} check failed: {reason}")]
    Failed { domain: CheckDomain, reason: String },

    #[error("checker returned counts for the wrong domain (expected {0})")]
    UnexpectedCounts(CheckDomain),
}

pub type Result<T> = std::result::Result<T, CheckerError>;
