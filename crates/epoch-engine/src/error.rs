//! Error types for epoch-engine operations.

use thiserror::Error;

/// Every way a conversion can fail on expected input.
///
/// The `Display` text of each variant is the reason string shown to callers,
/// either as an HTTP error body or as a per-element batch `error`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    #[error("empty input")]
    EmptyInput,

    #[error("only digits allowed")]
    NonDigit,

    #[error("value too long, likely pasted the wrong precision")]
    TooLong,

    #[error("invalid length, expected 10 (seconds) or 13 (milliseconds) digits")]
    InvalidLength,

    #[error("out of supported range (1970–2100)")]
    OutOfRange,

    #[error("invalid date format")]
    InvalidDate,

    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("invalid format parameter: {0}")]
    InvalidFormat(String),

    #[error("type must be 'unix-to-date' or 'date-to-unix'")]
    InvalidDirection,

    #[error("values array cannot be empty")]
    EmptyBatch,

    #[error("batch too large, maximum {max} values")]
    BatchTooLarge { max: usize },
}

pub type Result<T> = std::result::Result<T, ConvertError>;
