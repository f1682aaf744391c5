//! CLI argument parsing and command dispatch.
//!
//! This module provides the command-line interface for s3sift using clap's
//! derive API. Every filter flag is optional; whatever is given is
//! conjoined into one S3 Select query.
//!
//! # Example
//!
//! ```bash
//! s3sift --input s3://logs/app.jsonl.gz --with-id 42
//! s3sift --input s3://logs/app.jsonl.gz \
//!     --from-time 2024-01-01T00:00:00Z --to-time 2024-01-02T00:00:00Z
//! s3sift --input s3://logs/app.jsonl.gz --with-word timeout --print-query
//! ```

mod execute;
mod validators;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use s3sift_select::FilterCriteria;

use crate::config::ClientConfig;
use crate::locator::ObjectLocator;

// Re-export validators for external use
pub use validators::{validate_from_time, validate_input, validate_to_time};

/// s3sift - filter gzip-compressed JSON Lines objects in S3
///
/// Pushes the filter down to S3 Select so only matching records are
/// transferred. Matching records are written to stdout as JSON lines.
#[derive(Parser, Debug)]
#[command(name = "s3sift")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// S3 URI (`s3://{bucket}/{key}`) of the object to filter
    #[arg(long, value_name = "URI", value_parser = validate_input)]
    pub input: ObjectLocator,

    /// Select objects whose `id` equals this integer (0 means no filter)
    #[arg(long, value_name = "ID", allow_negative_numbers = true)]
    pub with_id: Option<i64>,

    /// Select objects whose `time` is at or after this RFC3339 timestamp
    #[arg(long, value_name = "RFC3339", value_parser = validate_from_time)]
    pub from_time: Option<String>,

    /// Select objects whose `time` is at or before this RFC3339 timestamp
    #[arg(long, value_name = "RFC3339", value_parser = validate_to_time)]
    pub to_time: Option<String>,

    /// Select objects whose `words` contain this word
    #[arg(long, value_name = "WORD")]
    pub with_word: Option<String>,

    /// Print the query instead of running it
    #[arg(long)]
    pub print_query: bool,

    /// YAML file with client settings (region, profile, endpoint-url, force-path-style)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// AWS region, overriding the config file and environment
    #[arg(long)]
    pub region: Option<String>,

    /// Named AWS profile, overriding the config file and environment
    #[arg(long)]
    pub profile: Option<String>,

    /// Custom endpoint for S3-compatible stores
    #[arg(long, value_name = "URL")]
    pub endpoint_url: Option<String>,

    /// Use path-style bucket addressing
    #[arg(long, overrides_with = "no_force_path_style")]
    pub force_path_style: bool,

    /// Use virtual-hosted bucket addressing, even if the config file enables path style
    #[arg(long, overrides_with = "force_path_style")]
    pub no_force_path_style: bool,
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Collect the filter flags into criteria.
    pub fn criteria(&self) -> FilterCriteria {
        let mut criteria = FilterCriteria::new();
        if let Some(id) = self.with_id {
            criteria = criteria.with_id(id);
        }
        if let Some(from_time) = &self.from_time {
            criteria = criteria.with_from_time(from_time.as_str());
        }
        if let Some(to_time) = &self.to_time {
            criteria = criteria.with_to_time(to_time.as_str());
        }
        if let Some(word) = &self.with_word {
            criteria = criteria.with_word(word.as_str());
        }
        criteria
    }

    /// Client settings given on the command line.
    pub fn client_overrides(&self) -> ClientConfig {
        ClientConfig {
            region: self.region.clone(),
            profile: self.profile.clone(),
            endpoint_url: self.endpoint_url.clone(),
            force_path_style: self.path_style_override(),
        }
    }

    /// `None` when neither path-style flag was given.
    fn path_style_override(&self) -> Option<bool> {
        if self.force_path_style {
            Some(true)
        } else if self.no_force_path_style {
            Some(false)
        } else {
            None
        }
    }

    /// Execute the CLI command
    pub async fn execute(&self) -> Result<()> {
        execute::execute_filter(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    // ========== CLI Parsing Tests ==========

    #[test]
    fn test_parse_input_only() {
        let cli = Cli::try_parse_from(["s3sift", "--input", "s3://bucket1/key1"]).unwrap();
        assert_eq!(cli.input, ObjectLocator::new("bucket1", "key1"));
        assert!(cli.criteria().is_empty());
        assert!(!cli.print_query);
    }

    #[test]
    fn test_parse_missing_input() {
        let err = Cli::try_parse_from(["s3sift", "--with-id", "1"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_parse_invalid_input() {
        let err = Cli::try_parse_from(["s3sift", "--input", "http://bucket1/key1"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_parse_all_filters() {
        let cli = Cli::try_parse_from([
            "s3sift",
            "--input",
            "s3://logs/app.jsonl.gz",
            "--with-id",
            "42",
            "--from-time",
            "2024-01-01T00:00:00Z",
            "--to-time",
            "2024-01-02T00:00:00Z",
            "--with-word",
            "timeout",
        ])
        .unwrap();

        let criteria = cli.criteria();
        assert_eq!(criteria.id, Some(42));
        assert_eq!(criteria.from_time.as_deref(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(criteria.to_time.as_deref(), Some("2024-01-02T00:00:00Z"));
        assert_eq!(criteria.word.as_deref(), Some("timeout"));
    }

    #[test]
    fn test_parse_zero_id_is_unset() {
        let cli = Cli::try_parse_from(["s3sift", "--input", "s3://b/k", "--with-id", "0"]).unwrap();
        assert_eq!(cli.criteria().id, None);
    }

    #[test]
    fn test_parse_negative_id() {
        let cli =
            Cli::try_parse_from(["s3sift", "--input", "s3://b/k", "--with-id", "-3"]).unwrap();
        assert_eq!(cli.criteria().id, Some(-3));
    }

    #[test]
    fn test_parse_non_integer_id() {
        let result = Cli::try_parse_from(["s3sift", "--input", "s3://b/k", "--with-id", "abc"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_invalid_from_time() {
        let err = Cli::try_parse_from([
            "s3sift",
            "--input",
            "s3://b/k",
            "--from-time",
            "not-a-timestamp",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        assert!(err.to_string().contains("--from-time value is invalid"));
    }

    #[test]
    fn test_parse_client_overrides() {
        let cli = Cli::try_parse_from([
            "s3sift",
            "--input",
            "s3://b/k",
            "--region",
            "us-east-2",
            "--endpoint-url",
            "http://localhost:9000",
            "--force-path-style",
        ])
        .unwrap();

        let overrides = cli.client_overrides();
        assert_eq!(overrides.region.as_deref(), Some("us-east-2"));
        assert_eq!(overrides.endpoint_url.as_deref(), Some("http://localhost:9000"));
        assert!(overrides.profile.is_none());
        assert_eq!(overrides.force_path_style, Some(true));
    }

    #[rstest]
    #[case::unset(&[], None)]
    #[case::on(&["--force-path-style"], Some(true))]
    #[case::off(&["--no-force-path-style"], Some(false))]
    #[case::last_wins(&["--no-force-path-style", "--force-path-style"], Some(true))]
    #[case::last_wins_off(&["--force-path-style", "--no-force-path-style"], Some(false))]
    fn test_path_style_flags(#[case] flags: &[&str], #[case] expected: Option<bool>) {
        let mut args = vec!["s3sift", "--input", "s3://b/k"];
        args.extend_from_slice(flags);
        let cli = Cli::try_parse_from(args).unwrap();

        assert_eq!(cli.client_overrides().force_path_style, expected);
    }
}
