//! Precision classification by digit count.

use serde::Serialize;

/// Whether a raw epoch count is in seconds or milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    Seconds,
    Milliseconds,
    /// Neither 10 nor 13 digits.
    Unknown,
}

/// Digit count of a seconds timestamp between 2001-09-09 and 2286-11-20.
pub const SECONDS_DIGITS: usize = 10;

/// Digit count of a milliseconds timestamp in the same span.
pub const MILLISECONDS_DIGITS: usize = 13;

/// Classify a numeric-looking string by how many ASCII digits it contains.
///
/// Non-digit characters are stripped before counting. The numeric value is never
/// inspected, so `"9999999999"` is still `Seconds`; range checking happens
/// separately in [`crate::bounds`].
///
/// # Examples
///
/// ```
/// use epoch_engine::precision::{classify, Precision};
///
/// assert_eq!(classify("1640995200"), Precision::Seconds);
/// assert_eq!(classify("1640995200000"), Precision::Milliseconds);
/// assert_eq!(classify("42"), Precision::Unknown);
/// ```
pub fn classify(raw: &str) -> Precision {
    match digit_count(raw) {
        SECONDS_DIGITS => Precision::Seconds,
        MILLISECONDS_DIGITS => Precision::Milliseconds,
        _ => Precision::Unknown,
    }
}

pub(crate) fn digit_count(raw: &str) -> usize {
    raw.chars().filter(char::is_ascii_digit).count()
}
