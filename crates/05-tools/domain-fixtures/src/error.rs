//! Errors raised while reading fixture text.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience result alias for fixture loading.
pub type FixtureResult<T, E = FixtureError> = Result<T, E>;

/// Every error except `Io` and `MissingHeader` carries the 1-based line number.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read fixture {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("fixture is empty or has no header line")]
    MissingHeader,
    #[error("line {line}: unknown fixture header `{header}`")]
    UnknownHeader { line: usize, header: String },
    #[error("line {line}: expected `key=value`, found `{text}`")]
    Malformed { line: usize, text: String },
    #[error("line {line}: unknown key `{key}`")]
    UnknownKey { line: usize, key: String },
    #[error("line {line}: invalid value `{value}` for `{key}`: {reason}")]
    InvalidValue {
        line: usize,
        key: String,
        value: String,
        reason: String,
    },
    #[error("line {line}: `{key}` indexes row {index} but only {count} were declared")]
    IndexOutOfRange {
        line: usize,
        key: String,
        index: usize,
        count: usize,
    },
    #[error("line {line}: declared count {count} exceeds the loader limit of {limit}")]
    CountTooLarge {
        line: usize,
        count: usize,
        limit: usize,
    },
}

impl FixtureError {
    /// Line the error points at, when it has one.
    pub fn line(&self) -> Option<usize> {
        match self {
            FixtureError::Io { .. } | FixtureError::MissingHeader => None,
            FixtureError::UnknownHeader { line, .. }
            | FixtureError::Malformed { line, .. }
            | FixtureError::UnknownKey { line, .. }
            | FixtureError::InvalidValue { line, .. }
            | FixtureError::IndexOutOfRange { line, .. }
            | FixtureError::CountTooLarge { line, .. } => Some(*line),
        }
    }
}
