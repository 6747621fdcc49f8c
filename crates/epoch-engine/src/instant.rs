//! Conversion between epoch counts and absolute instants.
//!
//! An [`Instant`] is a signed millisecond count since 1970-01-01T00:00:00Z. It carries
//! no timezone; zones are applied later by [`crate::zone`]. All arithmetic is exact
//! integer arithmetic.

use chrono::{DateTime, TimeZone, Utc};

use crate::error::{ConvertError, Result};
use crate::precision::Precision;

/// Epoch seconds of 2100-01-01T00:00:00Z, the last supported instant.
pub const MAX_EPOCH_SECONDS: i64 = 4_102_444_800;

/// [`MAX_EPOCH_SECONDS`] in milliseconds.
pub const MAX_EPOCH_MILLIS: i64 = MAX_EPOCH_SECONDS * 1000;

/// Largest count still read as seconds by the magnitude rule (2286-11-20).
pub const MAX_SECONDS_MAGNITUDE: i64 = 9_999_999_999;

/// An absolute point in time with millisecond resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant(i64);

impl Instant {
    pub const EPOCH: Instant = Instant(0);
    pub const MAX_SUPPORTED: Instant = Instant(MAX_EPOCH_MILLIS);

    pub const fn from_millis(millis: i64) -> Self {
        Instant(millis)
    }

    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// Whether the instant lies in `[1970-01-01T00:00:00Z, 2100-01-01T00:00:00Z]`.
    pub fn is_supported(self) -> bool {
        (Self::EPOCH..=Self::MAX_SUPPORTED).contains(&self)
    }

    /// The instant as a chrono UTC datetime.
    pub fn to_datetime(self) -> Result<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.0)
            .single()
            .ok_or(ConvertError::OutOfRange)
    }

    pub fn from_datetime<T: TimeZone>(dt: &DateTime<T>) -> Self {
        Instant(dt.timestamp_millis())
    }
}

/// Build an instant from an epoch count of the given precision.
///
/// `Unknown` precision cannot be converted and fails with
/// [`ConvertError::InvalidLength`].
pub fn to_instant(value: i64, precision: Precision) -> Result<Instant> {
    match precision {
        Precision::Seconds => value
            .checked_mul(1000)
            .map(Instant)
            .ok_or(ConvertError::OutOfRange),
        Precision::Milliseconds => Ok(Instant(value)),
        Precision::Unknown => Err(ConvertError::InvalidLength),
    }
}

/// Guess the precision of a bare number from its magnitude.
///
/// Anything above [`MAX_SECONDS_MAGNITUDE`] would be later than 2286 as seconds, so it
/// is read as milliseconds. Used where the digit-count classifier does not apply.
pub fn precision_from_magnitude(value: i64) -> Precision {
    if value > MAX_SECONDS_MAGNITUDE {
        Precision::Milliseconds
    } else {
        Precision::Seconds
    }
}

/// Whole seconds since the epoch, rounding toward negative infinity.
pub fn to_epoch_seconds(instant: Instant) -> i64 {
    instant.0.div_euclid(1000)
}

pub fn to_epoch_millis(instant: Instant) -> i64 {
    instant.0
}
