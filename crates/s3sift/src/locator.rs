//! Object locator parsing.
//!
//! The object to filter is named by a single `s3://bucket/key` URI.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// URI scheme prefix accepted for `--input`.
pub const S3_SCHEME: &str = "s3://";

/// Flag name reported when the locator is invalid.
pub const INPUT_FLAG: &str = "--input";

/// Identifies one object in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectLocator {
    /// Bucket name.
    pub bucket: String,
    /// Object key within the bucket.
    pub key: String,
}

impl ObjectLocator {
    /// Creates a locator from its parts.
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Parses an `s3://bucket/key` URI.
    ///
    /// The part after the scheme must split on `/` into exactly two
    /// non-empty segments, so keys containing `/` are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] naming `--input` if the scheme is not
    /// `s3://` or the remainder is not exactly `bucket/key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use s3sift::locator::ObjectLocator;
    ///
    /// let locator = ObjectLocator::parse("s3://logs/2024-01.jsonl.gz")?;
    /// assert_eq!(locator.bucket, "logs");
    /// assert_eq!(locator.key, "2024-01.jsonl.gz");
    /// # Ok::<(), s3sift::error::Error>(())
    /// ```
    pub fn parse(uri: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidInput {
            flag: INPUT_FLAG,
            reason: format!("'{uri}' is not an s3 URI of the form s3://bucket/key"),
        };

        let path = uri.strip_prefix(S3_SCHEME).ok_or_else(invalid)?;

        let mut segments = path.split('/');
        match (segments.next(), segments.next(), segments.next()) {
            (Some(bucket), Some(key), None) if !bucket.is_empty() && !key.is_empty() => {
                Ok(Self::new(bucket, key))
            }
            _ => Err(invalid()),
        }
    }
}

impl FromStr for ObjectLocator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ObjectLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{S3_SCHEME}{}/{}", self.bucket, self.key)
    }
}
