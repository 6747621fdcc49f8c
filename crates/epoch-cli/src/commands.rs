//! One-shot conversions for the command line. Each returns pretty-printed JSON.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use epoch_engine::batch::{run_batch, BatchResult};
use epoch_engine::format::FormatSpec;
use epoch_engine::pipeline::{self, RawValue};
use epoch_engine::Zone;
use serde::Serialize;
use tracing::debug;

use crate::cli::{BatchArgs, ToDateArgs, ToTimestampArgs};

pub fn to_date(args: &ToDateArgs) -> Result<String> {
    let zone = Zone::parse(&args.timezone)?;
    let format = FormatSpec::parse(&args.format)?;
    let result = pipeline::timestamp_to_date(&args.timestamp, &zone, &format)?;
    pretty(&result)
}

pub fn to_timestamp(args: &ToTimestampArgs) -> Result<String> {
    let zone = Zone::parse(&args.timezone)?;
    let result = pipeline::date_to_timestamp(&args.date, &zone)?;
    pretty(&result)
}

/// Convert a JSON array read from `args.input`, or stdin when it is absent or `-`.
pub fn batch(args: &BatchArgs) -> Result<String> {
    let source = match args.input.as_deref() {
        Some(path) if path != Path::new("-") => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };
    batch_from_str(args, &source)
}

fn batch_from_str(args: &BatchArgs, source: &str) -> Result<String> {
    let values: Vec<RawValue> = serde_json::from_str(source)
        .context("input must be a JSON array of strings or numbers")?;
    debug!(count = values.len(), direction = %args.kind, "running batch");

    let results = run_batch(args.kind, &values, &args.timezone, &args.format)?;
    pretty(&BatchResult { results })
}

fn pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed to serialize result")
}
