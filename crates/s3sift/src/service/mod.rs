//! Remote select service abstraction.
//!
//! The filter only needs one capability from the object store: run a query
//! against one object and hand back an ordered [`EventStream`]. This module
//! defines that seam as the [`SelectService`] trait, the request it takes,
//! and a factory for the AWS-backed implementation.
//!
//! # Test Utilities
//!
//! This module provides a [`MockSelectService`] implementation for testing
//! code that depends on the [`SelectService`] trait. To use it in your
//! tests, enable the `test-util` feature:
//!
//! ```toml
//! [dev-dependencies]
//! s3sift = { version = "...", features = ["test-util"] }
//! ```
//!
//! Then script the events the service should answer with:
//!
//! ```rust,ignore
//! use s3sift::service::{MockSelectService, SelectService};
//! use s3sift_select::SelectEvent;
//!
//! #[tokio::test]
//! async fn test_with_mock_service() {
//!     let service = MockSelectService::new([SelectEvent::Records(b"{}\n".to_vec())]);
//!     // Run a filter against &service...
//! }
//! ```

use async_trait::async_trait;
use s3sift_select::{EventStream, Query};

use crate::config::ClientConfig;
use crate::error::Result;
use crate::locator::ObjectLocator;

pub mod aws;

/// Encoding of the object being queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    /// Newline-delimited JSON under gzip.
    #[default]
    JsonLinesGzip,
}

/// Encoding of the records the service sends back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// JSON records, one per line.
    #[default]
    Json,
}

/// One select request against one object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectRequest {
    /// Object to query.
    pub locator: ObjectLocator,
    /// SQL expression to evaluate.
    pub query: Query,
    /// Encoding of the stored object.
    pub input: InputFormat,
    /// Encoding of the returned records.
    pub output: OutputFormat,
}

impl SelectRequest {
    /// Creates a request for gzip-compressed JSON Lines with JSON output.
    #[must_use]
    pub fn new(locator: ObjectLocator, query: Query) -> Self {
        Self {
            locator,
            query,
            input: InputFormat::JsonLinesGzip,
            output: OutputFormat::Json,
        }
    }
}

/// A service that can evaluate select requests.
///
/// Implementations must be `Send + Sync` so a shared handle can be used
/// from async contexts.
#[async_trait]
pub trait SelectService: Send + Sync {
    /// Sends `request` and returns the response event stream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RequestRejected`](crate::error::Error::RequestRejected)
    /// if the service refuses the request (bad expression, access denied,
    /// missing object, network failure) before any event is produced.
    async fn select(&self, request: &SelectRequest) -> Result<Box<dyn EventStream>>;
}

/// Create the AWS-backed service from client configuration.
///
/// # Errors
///
/// Returns [`Error::Client`](crate::error::Error::Client) if no region can
/// be resolved.
pub async fn create_service(config: &ClientConfig) -> Result<Box<dyn SelectService>> {
    let service = aws::AwsSelectService::from_config(config).await?;
    Ok(Box::new(service))
}

/// Mock implementation of [`SelectService`] for testing.
///
/// Answers every request with the same scripted events, optionally ending
/// in a terminal error, or rejects every request outright. Requests are
/// recorded so tests can inspect what was sent.
///
/// # Availability
///
/// This type is available when:
/// - Running tests (`#[cfg(test)]`)
/// - The `test-util` feature is enabled
#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Default)]
pub struct MockSelectService {
    events: Vec<s3sift_select::SelectEvent>,
    terminal_error: Option<String>,
    rejection: Option<String>,
    requests: std::sync::Mutex<Vec<SelectRequest>>,
}

#[cfg(any(test, feature = "test-util"))]
impl MockSelectService {
    /// Creates a service that answers with `events` and ends cleanly.
    pub fn new(events: impl IntoIterator<Item = s3sift_select::SelectEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Creates a service that rejects every request with `message`.
    pub fn rejecting(message: impl Into<String>) -> Self {
        Self {
            rejection: Some(message.into()),
            ..Self::default()
        }
    }

    /// Makes each response stream end with `message` as its terminal error.
    #[must_use]
    pub fn with_terminal_error(mut self, message: impl Into<String>) -> Self {
        self.terminal_error = Some(message.into());
        self
    }

    /// Returns the requests received so far.
    ///
    /// # Panics
    ///
    /// Panics if the request log mutex was poisoned.
    pub fn requests(&self) -> Vec<SelectRequest> {
        self.requests.lock().expect("request log poisoned").clone()
    }
}

#[cfg(any(test, feature = "test-util"))]
#[async_trait]
impl SelectService for MockSelectService {
    async fn select(&self, request: &SelectRequest) -> Result<Box<dyn EventStream>> {
        self.requests
            .lock()
            .expect("request log poisoned")
            .push(request.clone());

        if let Some(message) = &self.rejection {
            return Err(crate::error::Error::RequestRejected(message.clone().into()));
        }

        let mut stream = s3sift_select::event::ScriptedStream::new(self.events.clone());
        if let Some(message) = &self.terminal_error {
            stream = stream.with_terminal_error(message.clone());
        }
        Ok(Box::new(stream))
    }
}
