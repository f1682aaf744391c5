//! Running one select query and streaming its records to an output sink.
//!
//! A [`RecordStreamFilter`] moves through
//! `Idle → RequestSent → Streaming → Drained → {Success | Failed}` exactly
//! once. Nothing is retried; the first failure ends the run.

use s3sift_select::{Query, RecordRelay, RelaySummary};
use tokio::io::AsyncWrite;

use crate::error::Result;
use crate::locator::ObjectLocator;
use crate::service::{SelectRequest, SelectService};

/// Filters one object with one query.
#[derive(Debug, Clone)]
pub struct RecordStreamFilter {
    locator: ObjectLocator,
    query: Query,
    relay: RecordRelay,
}

impl RecordStreamFilter {
    /// Creates a filter for `locator` using `query`.
    #[must_use]
    pub fn new(locator: ObjectLocator, query: Query) -> Self {
        Self {
            locator,
            query,
            relay: RecordRelay::new(),
        }
    }

    /// Replaces the relay, e.g. to change the conduit capacity.
    #[must_use]
    pub fn with_relay(mut self, relay: RecordRelay) -> Self {
        self.relay = relay;
        self
    }

    /// The object being filtered.
    #[must_use]
    pub fn locator(&self) -> &ObjectLocator {
        &self.locator
    }

    /// The query being run.
    #[must_use]
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Issues the select request and copies every record payload to `sink`
    /// in arrival order.
    ///
    /// # Errors
    ///
    /// - [`Error::RequestRejected`](crate::error::Error::RequestRejected) if
    ///   the service refuses the request; nothing is written.
    /// - [`Error::Select`](crate::error::Error::Select) if writing to `sink`
    ///   fails or the stream ends with a terminal error. Bytes already
    ///   written stay in `sink`.
    pub async fn run<W>(&self, service: &dyn SelectService, sink: &mut W) -> Result<RelaySummary>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let request = SelectRequest::new(self.locator.clone(), self.query.clone());

        tracing::debug!(locator = %self.locator, query = %self.query, "Sending select request");
        let stream = service.select(&request).await.inspect_err(|e| {
            tracing::debug!(locator = %self.locator, error = %e, "Select request failed");
        })?;

        tracing::debug!(locator = %self.locator, "Streaming select results");
        match self.relay.run(stream, sink).await {
            Ok(summary) => {
                tracing::info!(
                    locator = %self.locator,
                    records_events = summary.records_events,
                    bytes = summary.bytes_relayed,
                    "Filter completed"
                );
                Ok(summary)
            }
            Err(e) => {
                tracing::debug!(locator = %self.locator, error = %e, "Filter failed after streaming");
                Err(e.into())
            }
        }
    }
}
