use thiserror::Error;

use crate::ownership::OwnershipError;

/// Validation errors raised when constructing domain values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ticker is blank")]
    BlankTicker,
    #[error("ticker '{ticker}' contains non-ASCII text")]
    NonAsciiTicker { ticker: String },
    #[error("ticker '{ticker}' is longer than {max} characters")]
    TickerTooLong { ticker: String, max: usize },
    #[error("ticker '{ticker}' must begin with a letter")]
    TickerStartsWithoutLetter { ticker: String },
    #[error("ticker '{ticker}' has an empty part around '.' or '-'")]
    TickerEmptyPart { ticker: String },
    #[error("ticker '{ticker}' contains '{ch}'; only letters, digits, '.' and '-' are allowed")]
    TickerBadCharacter { ticker: String, ch: char },

    #[error("invalid provider '{value}', expected one of alphavantage, fixture")]
    InvalidProvider { value: String },

    #[error("invalid calendar date '{value}', expected YYYY-MM-DD")]
    InvalidDate { value: String },
    #[error("price series for {symbol} contains duplicate date {date}")]
    DuplicateDate { symbol: String, date: String },

    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },
    #[error("field '{field}' must be greater than zero")]
    NonPositiveValue { field: &'static str },

    #[error("user id cannot be empty")]
    EmptyUserId,
}

/// Batch-level failures surfaced by the aggregation layer.
///
/// Per-symbol provider problems never appear here; they are carried inside
/// each [`ResolvedQuote`](crate::ResolvedQuote).
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("ownership lookup failed: {0}")]
    OwnershipLookupFailed(#[from] OwnershipError),

    #[error("request deadline of {timeout_ms}ms exceeded before all symbols settled")]
    DeadlineExceeded { timeout_ms: u64 },
}

impl AggregateError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::OwnershipLookupFailed(_) => "ownership.lookup_failed",
            Self::DeadlineExceeded { .. } => "request.deadline_exceeded",
        }
    }
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Ownership(#[from] OwnershipError),

    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
