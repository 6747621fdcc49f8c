//! Timezone projection: instant → wall clock, and wall clock → instant.
//!
//! Zones are IANA names resolved through `chrono-tz`, so daylight-saving rules are
//! applied for the specific instant rather than as a fixed offset.

use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc,
};
use chrono_tz::Tz;

use crate::error::{ConvertError, Result};
use crate::instant::Instant;

/// A validated timezone identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zone(Tz);

impl Zone {
    pub const UTC: Zone = Zone(Tz::UTC);

    /// Resolve an IANA timezone name (case-sensitive). `"UTC"` is always valid.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::InvalidTimezone`] carrying the name as given.
    pub fn parse(name: &str) -> Result<Self> {
        name.trim()
            .parse::<Tz>()
            .map(Zone)
            .map_err(|_| ConvertError::InvalidTimezone(name.to_string()))
    }

    /// The canonical IANA name, e.g. `"America/New_York"`.
    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    pub fn is_utc(&self) -> bool {
        self.0 == Tz::UTC
    }

    pub fn tz(&self) -> Tz {
        self.0
    }
}

impl Default for Zone {
    fn default() -> Self {
        Zone::UTC
    }
}

impl FromStr for Zone {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        Zone::parse(s)
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Wall-clock time of an instant in a specific zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CivilTime {
    local: DateTime<Tz>,
}

impl CivilTime {
    pub fn datetime(&self) -> &DateTime<Tz> {
        &self.local
    }

    /// Offset from UTC in seconds at this instant (e.g. `-18000` for EST).
    pub fn utc_offset_seconds(&self) -> i32 {
        self.local.offset().fix().local_minus_utc()
    }

    /// The zone's abbreviation at this instant (e.g. `"EST"`, `"EDT"`).
    pub fn abbreviation(&self) -> String {
        self.local.format("%Z").to_string()
    }

    /// ISO 8601 with milliseconds: `Z` for UTC, otherwise the numeric offset.
    ///
    /// Offsets with a seconds part (pre-1972 Monrovia) are written as `±HH:MM:SS`
    /// so the string still names the exact instant.
    pub fn to_iso_string(&self) -> String {
        let fmt = if self.local.timezone() == Tz::UTC {
            "%Y-%m-%dT%H:%M:%S%.3fZ"
        } else if self.utc_offset_seconds() % 60 != 0 {
            "%Y-%m-%dT%H:%M:%S%.3f%::z"
        } else {
            "%Y-%m-%dT%H:%M:%S%.3f%:z"
        };
        self.local.format(fmt).to_string()
    }
}

impl fmt::Display for CivilTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso_string())
    }
}

/// Render `instant` as wall-clock time in `zone`.
///
/// # Examples
///
/// ```
/// use epoch_engine::instant::Instant;
/// use epoch_engine::zone::{project, Zone};
///
/// let zone = Zone::parse("America/New_York").unwrap();
/// let civil = project(Instant::from_millis(1_640_995_200_000), &zone).unwrap();
/// assert_eq!(civil.to_string(), "2021-12-31T19:00:00.000-05:00");
/// assert_eq!(civil.abbreviation(), "EST");
/// ```
pub fn project(instant: Instant, zone: &Zone) -> Result<CivilTime> {
    let utc = instant.to_datetime()?;
    Ok(CivilTime {
        local: utc.with_timezone(&zone.tz()),
    })
}

/// Interpret a date/time string as local time in `zone` and return its instant.
///
/// An explicit offset or UTC designator in the string takes precedence over `zone`.
/// No range check is applied here; see [`crate::bounds::check_instant`].
///
/// # Errors
///
/// Returns [`ConvertError::InvalidDate`] when no supported form matches.
pub fn resolve(civil: &str, zone: &Zone) -> Result<Instant> {
    let s = civil.trim();
    if s.is_empty() {
        return Err(ConvertError::InvalidDate);
    }

    if let Some(dt) = parse_with_offset(s) {
        return Ok(Instant::from_datetime(&dt));
    }

    if let Some(naive) = strip_utc_designator(s).and_then(parse_naive) {
        return Ok(Instant::from_datetime(&Utc.from_utc_datetime(&naive)));
    }

    let naive = parse_naive(s).ok_or(ConvertError::InvalidDate)?;
    let local = localize(&naive, zone.tz())?;
    Ok(Instant::from_datetime(&local))
}

/// Attach `tz` to a naive wall-clock time.
///
/// Ambiguous times (DST fall-back) take the earlier instant. Nonexistent times
/// (spring-forward gap) are read with the offset in force before the gap, which
/// moves them forward by the gap length.
pub fn localize(naive: &NaiveDateTime, tz: Tz) -> Result<DateTime<Tz>> {
    if let Some(dt) = tz.from_local_datetime(naive).earliest() {
        return Ok(dt);
    }

    let probe = naive
        .checked_sub_signed(Duration::days(1))
        .ok_or(ConvertError::OutOfRange)?;
    let before = tz.offset_from_utc_datetime(&probe).fix();
    let utc = naive
        .checked_sub_signed(Duration::seconds(i64::from(before.local_minus_utc())))
        .ok_or(ConvertError::OutOfRange)?;
    Ok(tz.from_utc_datetime(&utc))
}

// ── Parsing tables ──────────────────────────────────────────────────────────

/// Forms carrying their own numeric offset. `%.f` is optional when parsing and
/// `%#z` takes `+HH`, `+HHMM` or `+HH:MM`.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M%#z",
];

/// Timezone-naive date+time forms, tried in order. US month-first wins over
/// day-first when both would match.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%B %d, %Y %I:%M:%S %p",
    "%B %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M",
    "%B %d %Y %I:%M:%S %p",
    "%B %d %Y %H:%M:%S",
    "%B %d %Y %H:%M",
    "%d %B %Y %H:%M:%S",
    "%d %B %Y %H:%M",
];

/// Date-only forms, read as local midnight.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
];

fn parse_with_offset(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .or_else(|| {
            OFFSET_FORMATS
                .iter()
                .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
        })
        .or_else(|| DateTime::parse_from_rfc2822(s).ok())
        .or_else(|| parse_with_second_offset(s))
}

/// `<naive datetime>±HH:MM:SS`, the form [`CivilTime::to_iso_string`] writes for
/// offsets that are not a whole number of minutes.
fn parse_with_second_offset(s: &str) -> Option<DateTime<FixedOffset>> {
    let split = s.len().checked_sub(9)?;
    let (head, offset) = (s.get(..split)?, s.get(split..)?.as_bytes());
    let sign = match offset[0] {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    if offset[3] != b':' || offset[6] != b':' {
        return None;
    }
    let field = |at: usize| -> Option<i32> {
        let pair = &offset[at..at + 2];
        pair.iter()
            .all(u8::is_ascii_digit)
            .then(|| i32::from(pair[0] - b'0') * 10 + i32::from(pair[1] - b'0'))
    };
    let seconds = field(1)? * 3600 + field(4)? * 60 + field(7)?;
    let tz = FixedOffset::east_opt(sign * seconds)?;
    tz.from_local_datetime(&parse_naive(head)?).single()
}

/// Strip a trailing `Z`, ` UTC` or ` GMT`, returning the remainder.
fn strip_utc_designator(s: &str) -> Option<&str> {
    s.strip_suffix('Z')
        .or_else(|| s.strip_suffix('z'))
        .or_else(|| s.strip_suffix(" UTC"))
        .or_else(|| s.strip_suffix(" GMT"))
        .map(str::trim_end)
}

fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
