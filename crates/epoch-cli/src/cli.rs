//! Command-line definitions.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use epoch_engine::pipeline::{Direction, DEFAULT_FORMAT, DEFAULT_TIMEZONE};

#[derive(Debug, Parser)]
#[command(
    name = "epoch",
    version,
    about = "Convert between Unix timestamps and calendar dates"
)]
pub struct Cli {
    /// Log filter used when RUST_LOG is unset (e.g. "info", "epoch=debug").
    #[arg(long, global = true, env = "EPOCH_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP conversion service.
    Serve(ServeArgs),
    /// Convert an epoch timestamp (seconds or milliseconds) to a date.
    ToDate(ToDateArgs),
    /// Convert a date string to epoch seconds and milliseconds.
    ToTimestamp(ToTimestampArgs),
    /// Convert a JSON array of values read from a file or stdin.
    Batch(BatchArgs),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to bind.
    #[arg(long, env = "EPOCH_HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to listen on.
    #[arg(long, env = "EPOCH_PORT", default_value_t = 3000)]
    pub port: u16,
}

#[derive(Debug, Args)]
pub struct ToDateArgs {
    /// Epoch count; values above 9999999999 are read as milliseconds.
    pub timestamp: String,

    /// IANA timezone name.
    #[arg(short, long, default_value = DEFAULT_TIMEZONE)]
    pub timezone: String,

    /// Output style (iso, us, uk, long) or a custom pattern such as "yyyy-MM-dd HH:mm".
    #[arg(short, long, default_value = DEFAULT_FORMAT)]
    pub format: String,
}

#[derive(Debug, Args)]
pub struct ToTimestampArgs {
    /// Date string, e.g. "2022-01-01" or "2022-01-01T12:00:00+02:00".
    pub date: String,

    /// Zone used for dates without an explicit offset.
    #[arg(short, long, default_value = DEFAULT_TIMEZONE)]
    pub timezone: String,
}

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// Conversion direction: unix-to-date or date-to-unix.
    #[arg(long = "type", value_name = "TYPE")]
    pub kind: Direction,

    #[arg(short, long, default_value = DEFAULT_TIMEZONE)]
    pub timezone: String,

    #[arg(short, long, default_value = DEFAULT_FORMAT)]
    pub format: String,

    /// JSON array file; reads stdin when omitted or "-".
    pub input: Option<PathBuf>,
}
