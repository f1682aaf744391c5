//! Error types for s3sift operations.

use std::io;
use thiserror::Error;

use s3sift_select::BoxError;

/// The error type for s3sift operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A command-line value failed validation.
    #[error("{flag} value is invalid - {reason}")]
    InvalidInput {
        /// Flag that carried the value, e.g. `--input`.
        flag: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Configuration file could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The object store client could not be constructed.
    #[error("Client error: {0}")]
    Client(String),

    /// The service rejected the select request before streaming began.
    #[error("select request rejected: {0}")]
    RequestRejected(#[source] BoxError),

    /// Query construction or result streaming failed.
    #[error(transparent)]
    Select(#[from] s3sift_select::Error),
}

/// A specialized Result type for s3sift operations.
pub type Result<T> = std::result::Result<T, Error>;
