//! Error types for s3sift-select operations.

use std::io;
use thiserror::Error;

/// Boxed error produced by a remote service implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type for s3sift-select operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A time filter was not a valid RFC3339 timestamp.
    #[error("{flag} value is invalid - {source}")]
    InvalidTimestamp {
        /// Name of the flag that carried the value, e.g. `--from-time`.
        flag: &'static str,
        /// The rejected value.
        value: String,
        /// Why the value was rejected.
        #[source]
        source: TimestampError,
    },

    /// IO error while copying relayed bytes into the output sink.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The event stream reported an error after it was drained.
    #[error("failed to read from select event stream: {0}")]
    Stream(#[source] BoxError),

    /// The producer task could not write a payload into the conduit because
    /// the reading side closed early.
    #[error("failed to relay record payload: {0}")]
    Relay(#[source] io::Error),

    /// The producer task panicked or was cancelled.
    #[error("relay task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

/// Reasons a timestamp is rejected.
///
/// chrono's RFC3339 parser tolerates a few forms the grammar does not allow;
/// the shape variants cover those.
#[derive(Debug, Error)]
pub enum TimestampError {
    /// The value did not parse as an RFC3339 timestamp at all.
    #[error(transparent)]
    Parse(#[from] chrono::ParseError),

    /// Date and time were joined by something other than `T`.
    #[error("date and time must be separated by 'T'")]
    Separator,

    /// The offset was neither `Z` nor `+hh:mm`/`-hh:mm`.
    #[error("time zone must be 'Z' or a +hh:mm / -hh:mm offset")]
    Zone,

    /// The seconds field was `60`.
    #[error("second out of range")]
    LeapSecond,
}

/// A specialized Result type for s3sift-select operations.
pub type Result<T> = std::result::Result<T, Error>;
