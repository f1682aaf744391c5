//! CLI input validation functions.
//!
//! These validators are used by clap's `value_parser` attribute to validate
//! user input at parse time, so a bad value prints usage and stops before
//! any remote work starts.

use s3sift_select::query::{FROM_TIME_FLAG, TO_TIME_FLAG, validate_timestamp};

use crate::locator::ObjectLocator;

/// Validate and parse the `--input` URI.
///
/// Delegates to [`ObjectLocator::parse`] to keep a single source of truth
/// for the URI rules.
pub fn validate_input(s: &str) -> Result<ObjectLocator, String> {
    ObjectLocator::parse(s.trim()).map_err(|e| e.to_string())
}

/// Validate the `--from-time` timestamp.
pub fn validate_from_time(s: &str) -> Result<String, String> {
    validate_time(FROM_TIME_FLAG, s)
}

/// Validate the `--to-time` timestamp.
pub fn validate_to_time(s: &str) -> Result<String, String> {
    validate_time(TO_TIME_FLAG, s)
}

fn validate_time(flag: &'static str, s: &str) -> Result<String, String> {
    let s = s.trim();
    validate_timestamp(flag, s).map_err(|e| e.to_string())?;
    Ok(s.to_string())
}
