//! Batch conversion with per-element failure isolation.

use serde::Serialize;

use crate::error::{ConvertError, Result};
use crate::format::FormatSpec;
use crate::pipeline::{value_to_date, value_to_timestamp, Direction, RawValue};
use crate::zone::Zone;

/// Largest accepted batch.
pub const MAX_BATCH_SIZE: usize = 1000;

/// Outcome of converting one batch element.
///
/// On failure `output` is empty and `error` carries the reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionResult {
    pub input: RawValue,
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConversionResult {
    fn settle(input: RawValue, outcome: Result<String>) -> Self {
        match outcome {
            Ok(output) => ConversionResult {
                input,
                output,
                error: None,
            },
            Err(err) => ConversionResult {
                input,
                output: String::new(),
                error: Some(err.to_string()),
            },
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Response body of a batch conversion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult {
    pub results: Vec<ConversionResult>,
}

/// Convert every value in order, isolating failures per element.
///
/// `timezone` and `format` are resolved once; if either is invalid, every element
/// carries that error. `format` is ignored for [`Direction::ToTimestamp`].
///
/// # Errors
///
/// Only the batch shape fails the whole call: [`ConvertError::EmptyBatch`] and
/// [`ConvertError::BatchTooLarge`].
///
/// # Examples
///
/// ```
/// use epoch_engine::batch::run_batch;
/// use epoch_engine::pipeline::{Direction, RawValue};
///
/// let values = vec![RawValue::from("1640995200"), RawValue::from("abc")];
/// let results = run_batch(Direction::ToDate, &values, "UTC", "iso").unwrap();
/// assert_eq!(results[0].output, "2022-01-01T00:00:00.000Z");
/// assert_eq!(results[1].error.as_deref(), Some("only digits allowed"));
/// ```
pub fn run_batch(
    direction: Direction,
    values: &[RawValue],
    timezone: &str,
    format: &str,
) -> Result<Vec<ConversionResult>> {
    if values.is_empty() {
        return Err(ConvertError::EmptyBatch);
    }
    if values.len() > MAX_BATCH_SIZE {
        return Err(ConvertError::BatchTooLarge {
            max: MAX_BATCH_SIZE,
        });
    }

    let zone = Zone::parse(timezone);
    let spec = match direction {
        Direction::ToDate => FormatSpec::parse(format),
        Direction::ToTimestamp => Ok(FormatSpec::Iso),
    };

    let convert = |value: &RawValue| -> Result<String> {
        let zone = zone.as_ref().map_err(Clone::clone)?;
        match direction {
            Direction::ToDate => {
                let spec = spec.as_ref().map_err(Clone::clone)?;
                value_to_date(value, zone, spec)
            }
            Direction::ToTimestamp => value_to_timestamp(value, zone),
        }
    };

    Ok(values
        .iter()
        .map(|value| ConversionResult::settle(value.clone(), convert(value)))
        .collect())
}
