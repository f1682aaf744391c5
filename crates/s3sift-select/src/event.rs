//! Select response events.
//!
//! A select request answers with an ordered sequence of [`SelectEvent`]s.
//! Only [`SelectEvent::Records`] carries output; the other kinds describe
//! progress and completion. An [`EventStream`] yields the events in arrival
//! order and keeps a separate terminal error slot that is checked once the
//! sequence is exhausted.

use async_trait::async_trait;

use crate::error::BoxError;

/// One event from a select response stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectEvent {
    /// A chunk of JSON output bytes.
    Records(Vec<u8>),

    /// Byte counters for the whole request.
    Stats {
        /// Bytes read from the object.
        bytes_scanned: i64,
        /// Bytes after decompression.
        bytes_processed: i64,
        /// Bytes sent back to the client.
        bytes_returned: i64,
    },

    /// Interim byte counters.
    Progress {
        /// Bytes read from the object so far.
        bytes_scanned: i64,
        /// Bytes decompressed so far.
        bytes_processed: i64,
        /// Bytes sent back so far.
        bytes_returned: i64,
    },

    /// Keep-alive sent while the service is still scanning.
    Continuation,

    /// The service finished sending events.
    End,
}

/// Ordered source of select events for one request.
///
/// Implementations release any underlying connection when dropped, so a
/// stream moved into the relay is closed on every exit path.
#[async_trait]
pub trait EventStream: Send {
    /// Returns the next event, or `None` once the sequence is exhausted.
    ///
    /// A stream that fails mid-transfer ends the sequence and stores the
    /// failure for [`take_error`](Self::take_error).
    async fn next_event(&mut self) -> Option<SelectEvent>;

    /// Takes the terminal error recorded while the stream was read, if any.
    fn take_error(&mut self) -> Option<BoxError>;
}

/// An [`EventStream`] that replays a fixed list of events.
///
/// Used as a stand-in for a remote service in tests.
#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Default)]
pub struct ScriptedStream {
    events: std::collections::VecDeque<SelectEvent>,
    terminal_error: Option<String>,
}

#[cfg(any(test, feature = "test-util"))]
impl ScriptedStream {
    /// Creates a stream that yields `events` then ends cleanly.
    pub fn new(events: impl IntoIterator<Item = SelectEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
            terminal_error: None,
        }
    }

    /// Makes the stream report `message` as its terminal error.
    #[must_use]
    pub fn with_terminal_error(mut self, message: impl Into<String>) -> Self {
        self.terminal_error = Some(message.into());
        self
    }
}

#[cfg(any(test, feature = "test-util"))]
#[async_trait]
impl EventStream for ScriptedStream {
    async fn next_event(&mut self) -> Option<SelectEvent> {
        self.events.pop_front()
    }

    fn take_error(&mut self) -> Option<BoxError> {
        self.terminal_error.take().map(BoxError::from)
    }
}
