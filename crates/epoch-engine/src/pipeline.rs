//! Single-value conversion pipelines shared by every adapter.
//!
//! Timestamp → date runs bounds → precision → instant → zone → format. Date →
//! timestamp parses the calendar string in its zone first and range-checks the
//! resulting instant afterwards.
//!
//! Two precision rules coexist:
//!
//! - [`timestamp_to_date`] and bare JSON numbers use the magnitude rule
//!   ([`precision_from_magnitude`]), so `"0"` is a valid timestamp.
//! - Digit strings in a batch go through the digit-count classifier and must be
//!   exactly 10 or 13 digits long.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::bounds;
use crate::error::{ConvertError, Result};
use crate::format::{render, FormatSpec};
use crate::instant::{precision_from_magnitude, to_epoch_millis, to_epoch_seconds, to_instant, Instant};
use crate::precision::classify;
use crate::zone::{project, resolve, Zone};

/// Zone applied when the caller names none.
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Output style applied when the caller names none.
pub const DEFAULT_FORMAT: &str = "iso";

/// Which way a value is converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Epoch count → calendar date.
    #[serde(rename = "unix-to-date")]
    ToDate,
    /// Calendar date → epoch count.
    #[serde(rename = "date-to-unix")]
    ToTimestamp,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::ToDate => "unix-to-date",
            Direction::ToTimestamp => "date-to-unix",
        }
    }
}

impl FromStr for Direction {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "unix-to-date" => Ok(Direction::ToDate),
            "date-to-unix" => Ok(Direction::ToTimestamp),
            _ => Err(ConvertError::InvalidDirection),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A caller-supplied value, exactly as it arrived: a string or a bare JSON number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Text(String),
    Number(serde_json::Number),
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl From<i64> for RawValue {
    fn from(n: i64) -> Self {
        RawValue::Number(n.into())
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Text(s) => f.write_str(s),
            RawValue::Number(n) => write!(f, "{n}"),
        }
    }
}

// ── timestamp → date ────────────────────────────────────────────────────────

/// The result of converting an epoch count to a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateConversion {
    /// Normalized epoch seconds (milliseconds input is divided down).
    pub timestamp: i64,
    /// The instant in the requested zone (ISO 8601 with offset, `Z` for UTC).
    pub date: String,
    /// The instant rendered in the requested format.
    pub formatted: String,
    /// The IANA timezone name used.
    pub timezone: String,
}

/// Convert a digit string to a date, choosing precision by magnitude.
///
/// # Errors
///
/// Empty input, non-digit characters, out-of-range values, and formatting
/// failures are returned as [`ConvertError`].
///
/// # Examples
///
/// ```
/// use epoch_engine::format::FormatSpec;
/// use epoch_engine::pipeline::timestamp_to_date;
/// use epoch_engine::zone::Zone;
///
/// let result = timestamp_to_date("1640995200000", &Zone::UTC, &FormatSpec::Iso).unwrap();
/// assert_eq!(result.timestamp, 1640995200);
/// assert_eq!(result.date, "2022-01-01T00:00:00.000Z");
/// ```
pub fn timestamp_to_date(raw: &str, zone: &Zone, format: &FormatSpec) -> Result<DateConversion> {
    let digits = bounds::check_digits(raw)?;
    let value = bounds::parse_digits(digits)?;
    let precision = precision_from_magnitude(value);
    bounds::check_epoch_range(value, precision)?;
    let instant = to_instant(value, precision)?;

    Ok(DateConversion {
        timestamp: to_epoch_seconds(instant),
        date: project(instant, zone)?.to_iso_string(),
        formatted: render(instant, zone, format)?,
        timezone: zone.name().to_string(),
    })
}

// ── date → timestamp ────────────────────────────────────────────────────────

/// The result of converting a date string to epoch counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimestampConversion {
    /// The instant in UTC (ISO 8601 with milliseconds).
    pub date: String,
    /// Epoch seconds.
    pub timestamp: i64,
    /// Epoch milliseconds.
    pub milliseconds: i64,
    /// The zone used for timezone-naive input.
    pub timezone: String,
}

/// Convert a date string to epoch counts. Naive input is read as local time in `zone`.
///
/// # Errors
///
/// Returns [`ConvertError::InvalidDate`] for unparsable input and
/// [`ConvertError::OutOfRange`] for instants outside 1970–2100.
pub fn date_to_timestamp(raw: &str, zone: &Zone) -> Result<TimestampConversion> {
    bounds::validate_for_direction(raw, Direction::ToTimestamp)?;
    let instant = bounds::check_instant(resolve(raw, zone)?)?;

    Ok(TimestampConversion {
        date: render(instant, &Zone::UTC, &FormatSpec::Iso)?,
        timestamp: to_epoch_seconds(instant),
        milliseconds: to_epoch_millis(instant),
        timezone: zone.name().to_string(),
    })
}

// ── batch element conversions ───────────────────────────────────────────────

/// Convert one batch element to a formatted date.
///
/// Strings run the full digit-count validation. Integers use the magnitude rule;
/// non-integer numbers are rejected as non-digits.
pub fn value_to_date(value: &RawValue, zone: &Zone, format: &FormatSpec) -> Result<String> {
    let instant = match value {
        RawValue::Text(text) => {
            bounds::validate_for_direction(text, Direction::ToDate)?;
            let digits = text.trim();
            to_instant(bounds::parse_digits(digits)?, classify(digits))?
        }
        RawValue::Number(number) => number_to_instant(number)?,
    };
    render(instant, zone, format)
}

/// Convert one batch element to an epoch-seconds string.
pub fn value_to_timestamp(value: &RawValue, zone: &Zone) -> Result<String> {
    let text = value.to_string();
    date_to_timestamp(&text, zone).map(|converted| converted.timestamp.to_string())
}

fn number_to_instant(number: &serde_json::Number) -> Result<Instant> {
    let value = match number.as_i64() {
        Some(value) => value,
        None if number.is_u64() => return Err(ConvertError::OutOfRange),
        None => return Err(ConvertError::NonDigit),
    };
    let precision = precision_from_magnitude(value);
    bounds::check_epoch_range(value, precision)?;
    to_instant(value, precision)
}
