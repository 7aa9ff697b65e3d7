use std::path::PathBuf;

use thiserror::Error;

/// Validation and contract errors exposed by `bovalor-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ticker cannot be empty")]
    EmptyTicker,
    #[error("ticker length {len} exceeds max {max}")]
    TickerTooLong { len: usize, max: usize },
    #[error("ticker must start with an ASCII letter: '{ch}'")]
    TickerInvalidStart { ch: char },
    #[error("ticker contains invalid character '{ch}' at index {index}")]
    TickerInvalidChar { ch: char, index: usize },

    #[error("date must be ISO-8601 calendar format (YYYY-MM-DD): '{value}'")]
    InvalidDate { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("price series must be ordered by date ascending")]
    UnorderedSeries,

    #[error("graham intrinsic value requires eps > 0 and book value > 0")]
    NonPositiveGrahamInputs,
}

/// Reference-file (universe) loading errors.
///
/// These are fatal at startup: with no tickers nothing downstream can run.
#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("cannot read universe file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("universe file {path} is empty")]
    Empty { path: PathBuf },

    #[error("universe file {path} has no '{column}' column")]
    MissingColumn { path: PathBuf, column: String },

    #[error("universe file {path} line {line}: {source}")]
    InvalidCode {
        path: PathBuf,
        line: usize,
        #[source]
        source: ValidationError,
    },
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Universe(#[from] UniverseError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
