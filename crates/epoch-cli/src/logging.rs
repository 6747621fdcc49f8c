//! Tracing subscriber initialization.
//!
//! Logs go to stderr so stdout stays reserved for command output. `RUST_LOG`
//! takes precedence over the configured filter.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Error type for logging initialization failures.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The configured filter could not be parsed
    #[error("Invalid log filter {filter:?}: {source}")]
    InvalidFilter {
        /// The filter string as given
        filter: String,
        /// The underlying parse error
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    /// Tracing subscriber already initialized
    #[error("Tracing subscriber already initialized")]
    SubscriberAlreadySet,
}

/// Install the global subscriber.
///
/// Uses `RUST_LOG` when it is set and valid, otherwise `default_filter`.
pub fn init(default_filter: &str) -> Result<(), LoggingError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => parse_filter(default_filter)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|_| LoggingError::SubscriberAlreadySet)
}

fn parse_filter(directives: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(directives).map_err(|source| LoggingError::InvalidFilter {
        filter: directives.to_string(),
        source,
    })
}
