//! # epoch-engine
//!
//! Deterministic conversion between Unix epoch timestamps and calendar dates.
//!
//! Every function is pure: no I/O, no system clock, no shared state. The same
//! inputs always produce the same output, so callers may run conversions on any
//! number of threads without coordination.
//!
//! ## Modules
//!
//! - [`precision`] — Digit-count classification: seconds, milliseconds, or unknown
//! - [`bounds`] — Input validation and the 1970–2100 supported range
//! - [`instant`] — Epoch count ↔ absolute instant, plus the magnitude precision rule
//! - [`zone`] — IANA timezone projection and zone-aware date parsing
//! - [`format`] — Named output styles (`iso`, `us`, `uk`, `long`) and custom patterns
//! - [`pipeline`] — Single-value timestamp → date and date → timestamp conversions
//! - [`batch`] — Ordered batch conversion with per-element failure isolation
//! - [`error`] — Error types

pub mod batch;
pub mod bounds;
pub mod error;
pub mod format;
pub mod instant;
pub mod pipeline;
pub mod precision;
pub mod zone;

pub use batch::{run_batch, BatchResult, ConversionResult, MAX_BATCH_SIZE};
pub use bounds::validate_for_direction;
pub use error::ConvertError;
pub use format::{render, FormatSpec};
pub use instant::{Instant, MAX_EPOCH_SECONDS};
pub use pipeline::{
    date_to_timestamp, timestamp_to_date, DateConversion, Direction, RawValue,
    TimestampConversion, DEFAULT_FORMAT, DEFAULT_TIMEZONE,
};
pub use precision::{classify, Precision};
pub use zone::{project, resolve, CivilTime, Zone};
