//! Rendering an instant in a zone as one of the named styles or a custom pattern.
//!
//! # Named styles
//!
//! | Style  | Shape                                  |
//! |--------|----------------------------------------|
//! | `iso`  | `2022-01-01T00:00:00.000Z` (always UTC) |
//! | `us`   | `01/01/2022 12:00:00 AM UTC`            |
//! | `uk`   | `01/01/2022 00:00:00 UTC`               |
//! | `long` | `January 01, 2022 12:00:00 AM UTC`      |
//!
//! Non-ISO styles end in ` UTC` for the UTC zone and in the zone's abbreviation
//! (`EST`, `CET`, ...) otherwise. Style names match case-insensitively.
//!
//! # Custom patterns
//!
//! Anything else is a date-fns style pattern, matched case-sensitively:
//! `yyyy-MM-dd HH:mm:ss`, `EEEE, MMMM d 'at' h:mm a zzz`, and so on. Letters outside
//! the supported token set must be quoted.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Offset, Timelike};
use chrono_tz::Tz;

use crate::error::{ConvertError, Result};
use crate::instant::Instant;
use crate::zone::{project, Zone};

/// A requested output rendering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormatSpec {
    /// UTC ISO 8601 with milliseconds, whatever the zone.
    #[default]
    Iso,
    Us,
    Uk,
    Long,
    Pattern(Pattern),
}

impl FormatSpec {
    /// Parse a style name or, failing that, a custom pattern.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::InvalidFormat`] if the pattern is empty, has an
    /// unterminated quote, or uses an unsupported token.
    pub fn parse(spec: &str) -> Result<Self> {
        match spec.to_ascii_lowercase().as_str() {
            "iso" => Ok(FormatSpec::Iso),
            "us" => Ok(FormatSpec::Us),
            "uk" => Ok(FormatSpec::Uk),
            "long" => Ok(FormatSpec::Long),
            _ => Pattern::parse(spec).map(FormatSpec::Pattern),
        }
    }
}

impl FromStr for FormatSpec {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        FormatSpec::parse(s)
    }
}

/// Render `instant` in `zone` according to `spec`.
///
/// # Examples
///
/// ```
/// use epoch_engine::format::{render, FormatSpec};
/// use epoch_engine::instant::Instant;
/// use epoch_engine::zone::Zone;
///
/// let instant = Instant::from_millis(1_640_995_200_000);
/// let us = render(instant, &Zone::UTC, &FormatSpec::Us).unwrap();
/// assert_eq!(us, "01/01/2022 12:00:00 AM UTC");
/// ```
pub fn render(instant: Instant, zone: &Zone, spec: &FormatSpec) -> Result<String> {
    let civil = project(instant, zone)?;
    let local = civil.datetime();
    let suffix = if zone.is_utc() {
        "UTC".to_string()
    } else {
        civil.abbreviation()
    };

    let rendered = match spec {
        FormatSpec::Iso => instant
            .to_datetime()?
            .format("%Y-%m-%dT%H:%M:%S%.3fZ")
            .to_string(),
        FormatSpec::Us => format!("{} {suffix}", local.format("%m/%d/%Y %I:%M:%S %p")),
        FormatSpec::Uk => format!("{} {suffix}", local.format("%d/%m/%Y %H:%M:%S")),
        FormatSpec::Long => format!("{} {suffix}", local.format("%B %d, %Y %I:%M:%S %p")),
        FormatSpec::Pattern(pattern) => pattern.apply(local),
    };
    Ok(rendered)
}

// ── Custom patterns ─────────────────────────────────────────────────────────

/// A tokenized custom pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    tokens: Vec<Token>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    /// A run of `width` copies of the same pattern letter.
    Field { letter: char, width: usize },
}

impl Pattern {
    /// Tokenize a pattern, rejecting anything that cannot be rendered.
    pub fn parse(source: &str) -> Result<Self> {
        let invalid = || ConvertError::InvalidFormat(source.to_string());
        if source.is_empty() {
            return Err(invalid());
        }

        let chars: Vec<char> = source.chars().collect();
        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut i = 0;

        while i < chars.len() {
            let ch = chars[i];
            if ch == '\'' {
                // '' is an escaped quote; otherwise read up to the closing quote.
                if chars.get(i + 1) == Some(&'\'') {
                    literal.push('\'');
                    i += 2;
                    continue;
                }
                i += 1;
                loop {
                    match chars.get(i) {
                        None => return Err(invalid()),
                        Some('\'') if chars.get(i + 1) == Some(&'\'') => {
                            literal.push('\'');
                            i += 2;
                        }
                        Some('\'') => {
                            i += 1;
                            break;
                        }
                        Some(&c) => {
                            literal.push(c);
                            i += 1;
                        }
                    }
                }
            } else if ch.is_ascii_alphabetic() {
                let width = chars[i..].iter().take_while(|&&c| c == ch).count();
                if !is_supported(ch, width) {
                    return Err(invalid());
                }
                if !literal.is_empty() {
                    tokens.push(Token::Literal(std::mem::take(&mut literal)));
                }
                tokens.push(Token::Field { letter: ch, width });
                i += width;
            } else {
                literal.push(ch);
                i += 1;
            }
        }
        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }

        Ok(Pattern {
            source: source.to_string(),
            tokens,
        })
    }

    fn apply(&self, dt: &DateTime<Tz>) -> String {
        let mut out = String::with_capacity(self.source.len() * 2);
        for token in &self.tokens {
            match token {
                Token::Literal(text) => out.push_str(text),
                Token::Field { letter, width } => push_field(&mut out, dt, *letter, *width),
            }
        }
        out
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn is_supported(letter: char, width: usize) -> bool {
    match letter {
        'y' => matches!(width, 1 | 2 | 4),
        'M' => (1..=4).contains(&width),
        'E' => (1..=4).contains(&width),
        'd' | 'H' | 'h' | 'm' | 's' => matches!(width, 1 | 2),
        'S' => (1..=3).contains(&width),
        'a' => (1..=3).contains(&width),
        'z' => (1..=4).contains(&width),
        'x' | 'X' => matches!(width, 2 | 3),
        'Q' | 't' | 'T' => width == 1,
        _ => false,
    }
}

fn push_field(out: &mut String, dt: &DateTime<Tz>, letter: char, width: usize) {
    let text = match (letter, width) {
        ('y', 4) => format!("{:04}", dt.year()),
        ('y', 2) => format!("{:02}", dt.year().rem_euclid(100)),
        ('y', _) => dt.year().to_string(),
        ('M', 1) => dt.month().to_string(),
        ('M', 2) => format!("{:02}", dt.month()),
        ('M', 3) => dt.format("%b").to_string(),
        ('M', _) => dt.format("%B").to_string(),
        ('d', 1) => dt.day().to_string(),
        ('d', _) => format!("{:02}", dt.day()),
        ('E', 4) => dt.format("%A").to_string(),
        ('E', _) => dt.format("%a").to_string(),
        ('H', 1) => dt.hour().to_string(),
        ('H', _) => format!("{:02}", dt.hour()),
        ('h', 1) => dt.hour12().1.to_string(),
        ('h', _) => format!("{:02}", dt.hour12().1),
        ('m', 1) => dt.minute().to_string(),
        ('m', _) => format!("{:02}", dt.minute()),
        ('s', 1) => dt.second().to_string(),
        ('s', _) => format!("{:02}", dt.second()),
        ('S', width) => {
            let millis = dt.timestamp_subsec_millis().min(999);
            let digits = format!("{millis:03}");
            digits[..width].to_string()
        }
        ('a', 3) => (if dt.hour12().0 { "pm" } else { "am" }).to_string(),
        ('a', _) => (if dt.hour12().0 { "PM" } else { "AM" }).to_string(),
        ('z', 4) => dt.timezone().name().to_string(),
        ('z', _) => dt.format("%Z").to_string(),
        ('X', _) if dt.offset().fix().local_minus_utc() == 0 => "Z".to_string(),
        ('X', 2) | ('x', 2) => dt.format("%z").to_string(),
        ('X', _) | ('x', _) => dt.format("%:z").to_string(),
        ('Q', _) => ((dt.month() - 1) / 3 + 1).to_string(),
        ('t', _) => dt.timestamp().to_string(),
        ('T', _) => dt.timestamp_millis().to_string(),
        _ => String::new(),
    };
    out.push_str(&text);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_year_2022() -> Instant {
        Instant::from_millis(1_640_995_200_000)
    }

    fn ny() -> Zone {
        Zone::parse("America/New_York").unwrap()
    }

    fn render_str(instant: Instant, zone: &Zone, spec: &str) -> Result<String> {
        render(instant, zone, &FormatSpec::parse(spec)?)
    }

    // ── Named styles ────────────────────────────────────────────────────

    #[test]
    fn test_iso_is_always_utc() {
        assert_eq!(
            render_str(new_year_2022(), &ny(), "iso").unwrap(),
            "2022-01-01T00:00:00.000Z"
        );
    }

    #[test]
    fn test_us_style() {
        assert_eq!(
            render_str(new_year_2022(), &Zone::UTC, "us").unwrap(),
            "01/01/2022 12:00:00 AM UTC"
        );
        assert_eq!(
            render_str(new_year_2022(), &ny(), "us").unwrap(),
            "12/31/2021 07:00:00 PM EST"
        );
    }

    #[test]
    fn test_uk_style_is_24_hour() {
        assert_eq!(
            render_str(new_year_2022(), &ny(), "uk").unwrap(),
            "31/12/2021 19:00:00 EST"
        );
    }

    #[test]
    fn test_long_style() {
        assert_eq!(
            render_str(new_year_2022(), &Zone::UTC, "long").unwrap(),
            "January 01, 2022 12:00:00 AM UTC"
        );
    }

    #[test]
    fn test_style_names_case_insensitive() {
        assert_eq!(FormatSpec::parse("ISO").unwrap(), FormatSpec::Iso);
        assert_eq!(FormatSpec::parse("Long").unwrap(), FormatSpec::Long);
    }

    #[test]
    fn test_summer_abbreviation() {
        // 2022-07-01T16:00:00Z is noon EDT
        let instant = Instant::from_millis(1_656_691_200_000);
        assert_eq!(
            render_str(instant, &ny(), "us").unwrap(),
            "07/01/2022 12:00:00 PM EDT"
        );
    }

    // ── Custom patterns ─────────────────────────────────────────────────

    #[test]
    fn test_pattern_basic() {
        assert_eq!(
            render_str(new_year_2022(), &Zone::UTC, "yyyy-MM-dd HH:mm:ss").unwrap(),
            "2022-01-01 00:00:00"
        );
    }

    #[test]
    fn test_pattern_is_zone_aware() {
        assert_eq!(
            render_str(new_year_2022(), &ny(), "yyyy-MM-dd HH:mm zzz").unwrap(),
            "2021-12-31 19:00 EST"
        );
    }

    #[test]
    fn test_pattern_names_and_12_hour() {
        assert_eq!(
            render_str(new_year_2022(), &ny(), "EEEE, MMMM d 'at' h:mm a").unwrap(),
            "Friday, December 31 at 7:00 PM"
        );
        assert_eq!(
            render_str(new_year_2022(), &ny(), "EEE MMM yy aaa").unwrap(),
            "Fri Dec 21 pm"
        );
    }

    #[test]
    fn test_pattern_offsets() {
        assert_eq!(render_str(new_year_2022(), &ny(), "xxx").unwrap(), "-05:00");
        assert_eq!(render_str(new_year_2022(), &ny(), "XX").unwrap(), "-0500");
        assert_eq!(render_str(new_year_2022(), &Zone::UTC, "XXX").unwrap(), "Z");
        assert_eq!(render_str(new_year_2022(), &Zone::UTC, "xxx").unwrap(), "+00:00");
    }

    #[test]
    fn test_pattern_millis_and_epoch() {
        let instant = Instant::from_millis(1_640_995_200_987);
        assert_eq!(render_str(instant, &Zone::UTC, "ss.SSS").unwrap(), "00.987");
        assert_eq!(render_str(instant, &Zone::UTC, "S").unwrap(), "9");
        assert_eq!(render_str(instant, &Zone::UTC, "t").unwrap(), "1640995200");
        assert_eq!(render_str(instant, &Zone::UTC, "T").unwrap(), "1640995200987");
    }

    #[test]
    fn test_pattern_quarter_and_zone_id() {
        assert_eq!(render_str(new_year_2022(), &ny(), "'Q'Q zzzz").unwrap(), "Q4 America/New_York");
    }

    #[test]
    fn test_pattern_escaped_quote() {
        assert_eq!(
            render_str(new_year_2022(), &Zone::UTC, "yyyy''MM 'o''clock'").unwrap(),
            "2022'01 o'clock"
        );
    }

    #[test]
    fn test_pattern_is_case_sensitive() {
        // "mm" is minutes, "MM" is month
        assert_eq!(render_str(new_year_2022(), &Zone::UTC, "mm").unwrap(), "00");
        assert_eq!(render_str(new_year_2022(), &Zone::UTC, "MM").unwrap(), "01");
    }

    #[test]
    fn test_invalid_patterns_rejected() {
        for spec in ["", "foo", "yyy", "'unterminated", "HHH", "b"] {
            let err = FormatSpec::parse(spec).unwrap_err();
            assert_eq!(err, ConvertError::InvalidFormat(spec.to_string()), "spec: {spec:?}");
        }
    }

    #[test]
    fn test_invalid_format_message() {
        let err = FormatSpec::parse("bogus").unwrap_err();
        assert_eq!(err.to_string(), "invalid format parameter: bogus");
    }

    #[test]
    fn test_render_is_idempotent() {
        let spec = FormatSpec::parse("long").unwrap();
        let first = render(new_year_2022(), &ny(), &spec).unwrap();
        let second = render(new_year_2022(), &ny(), &spec).unwrap();
        assert_eq!(first, second);
    }
}
