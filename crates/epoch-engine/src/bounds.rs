//! Input validation ahead of (or right after) conversion.
//!
//! Numeric timestamps are range-checked before any parsing. Calendar strings can only
//! be range-checked once they resolve to an [`Instant`], so that direction is checked
//! by [`check_instant`] after parsing.

use crate::error::{ConvertError, Result};
use crate::instant::{Instant, MAX_EPOCH_MILLIS, MAX_EPOCH_SECONDS};
use crate::pipeline::Direction;
use crate::precision::{classify, digit_count, Precision, MILLISECONDS_DIGITS};

/// Validate a raw value before it enters the pipeline in `direction`.
///
/// For [`Direction::ToDate`] this is the full numeric check: non-empty, digits only,
/// 10 or 13 digits, and inside 1970–2100 for the detected precision. For
/// [`Direction::ToTimestamp`] only emptiness is checked here.
///
/// # Errors
///
/// Returns the [`ConvertError`] whose message explains the rejection.
pub fn validate_for_direction(raw: &str, direction: Direction) -> Result<()> {
    match direction {
        Direction::ToDate => {
            let digits = check_digits(raw)?;
            let precision = classify(digits);
            if precision == Precision::Unknown {
                return Err(if digit_count(digits) > MILLISECONDS_DIGITS {
                    ConvertError::TooLong
                } else {
                    ConvertError::InvalidLength
                });
            }
            check_epoch_range(parse_digits(digits)?, precision)
        }
        Direction::ToTimestamp => {
            if raw.trim().is_empty() {
                Err(ConvertError::EmptyInput)
            } else {
                Ok(())
            }
        }
    }
}

/// Trim `raw` and require a non-empty, all-ASCII-digit string.
pub fn check_digits(raw: &str) -> Result<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConvertError::EmptyInput);
    }
    if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConvertError::NonDigit);
    }
    Ok(trimmed)
}

/// Parse an all-digit string. Values too large for `i64` are out of range.
pub fn parse_digits(digits: &str) -> Result<i64> {
    digits.parse::<i64>().map_err(|_| ConvertError::OutOfRange)
}

/// Check an epoch count against the supported range for its precision.
pub fn check_epoch_range(value: i64, precision: Precision) -> Result<()> {
    let max = match precision {
        Precision::Seconds => MAX_EPOCH_SECONDS,
        Precision::Milliseconds => MAX_EPOCH_MILLIS,
        Precision::Unknown => return Err(ConvertError::InvalidLength),
    };
    if (0..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConvertError::OutOfRange)
    }
}

/// Post-parse check for the calendar-string direction.
pub fn check_instant(instant: Instant) -> Result<Instant> {
    if instant.is_supported() {
        Ok(instant)
    } else {
        Err(ConvertError::OutOfRange)
    }
}
