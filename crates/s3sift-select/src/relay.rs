//! Relaying record payloads from an event stream into an output sink.
//!
//! The relay runs two units of work connected by a bounded in-memory byte
//! conduit:
//!
//! - a producer task that owns the [`EventStream`], writes every
//!   [`SelectEvent::Records`] payload into the conduit and closes it when the
//!   stream is exhausted;
//! - the calling task, which copies the conduit into the sink until EOF.
//!
//! Writes into the conduit block once it is full, so a result of any size
//! is never buffered whole. The stream's terminal error is only checked
//! after the conduit has been drained, which means every byte that arrived
//! reaches the sink before a failure is reported. Output written before a
//! terminal error is not rolled back.

use std::io;

use tokio::io::{AsyncWrite, AsyncWriteExt, DuplexStream};

use crate::error::{Error, Result};
use crate::event::{EventStream, SelectEvent};

/// Default conduit capacity in bytes.
pub const DEFAULT_CONDUIT_CAPACITY: usize = 64 * 1024;

/// Counters for a completed relay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelaySummary {
    /// Number of records events forwarded.
    pub records_events: u64,
    /// Total payload bytes forwarded.
    pub bytes_relayed: u64,
}

/// Copies record payloads from an [`EventStream`] to an async sink.
///
/// # Examples
///
/// ```
/// use s3sift_select::event::{ScriptedStream, SelectEvent};
/// use s3sift_select::relay::RecordRelay;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), s3sift_select::Error> {
/// let stream = ScriptedStream::new([
///     SelectEvent::Records(b"{\"id\":1}\n".to_vec()),
///     SelectEvent::End,
/// ]);
///
/// let mut out = Vec::new();
/// let summary = RecordRelay::new().run(Box::new(stream), &mut out).await?;
///
/// assert_eq!(out, b"{\"id\":1}\n");
/// assert_eq!(summary.records_events, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RecordRelay {
    capacity: usize,
}

impl RecordRelay {
    /// Creates a relay with the default conduit capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CONDUIT_CAPACITY)
    }

    /// Creates a relay whose conduit holds at most `capacity` bytes.
    ///
    /// A capacity of zero is raised to one byte.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
        }
    }

    /// Returns the conduit capacity in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drains `stream` into `sink`.
    ///
    /// Must be called from within a Tokio runtime. The stream is dropped
    /// before this returns, whatever the outcome.
    ///
    /// # Errors
    ///
    /// In order of precedence:
    ///
    /// - [`Error::Io`] if copying into or flushing the sink fails
    /// - [`Error::Stream`] if the stream reports a terminal error
    /// - [`Error::Relay`] if the producer could not write into the conduit.
    ///   That only happens once the reader side is closed, and here the
    ///   reader is closed early only after a sink failure, which is reported
    ///   first.
    /// - [`Error::TaskFailed`] if the producer task panicked
    pub async fn run<W>(&self, stream: Box<dyn EventStream>, sink: &mut W) -> Result<RelaySummary>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let (mut conduit_reader, conduit_writer) = tokio::io::duplex(self.capacity);
        let producer = tokio::spawn(drain_events(stream, conduit_writer));

        let copied = match tokio::io::copy(&mut conduit_reader, sink).await {
            Ok(bytes) => sink.flush().await.map(|()| bytes),
            Err(e) => Err(e),
        };
        // Unblocks the producer if the copy stopped early.
        drop(conduit_reader);

        let (mut stream, drained) = producer.await?;
        let terminal_error = stream.take_error();
        drop(stream);

        let bytes_copied = copied?;
        if let Some(err) = terminal_error {
            tracing::warn!(bytes_copied, "Event stream ended with an error");
            return Err(Error::Stream(err));
        }
        let summary = drained.map_err(Error::Relay)?;

        tracing::debug!(
            records_events = summary.records_events,
            bytes_relayed = summary.bytes_relayed,
            bytes_copied,
            "Relay drained"
        );
        Ok(summary)
    }
}

impl Default for RecordRelay {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer side: forwards payloads until the stream ends, then hands the
/// stream back so the caller can check its terminal error.
async fn drain_events(
    mut stream: Box<dyn EventStream>,
    mut conduit: DuplexStream,
) -> (Box<dyn EventStream>, io::Result<RelaySummary>) {
    let mut summary = RelaySummary::default();

    let result = loop {
        let Some(event) = stream.next_event().await else {
            break Ok(summary);
        };

        if let SelectEvent::Records(payload) = event {
            if let Err(e) = conduit.write_all(&payload).await {
                tracing::debug!(error = %e, "Conduit closed while relaying records");
                break Err(e);
            }
            summary.records_events += 1;
            summary.bytes_relayed += payload.len() as u64;
        }
    };

    // Dropping the write half signals EOF to the reader.
    drop(conduit);
    (stream, result)
}
