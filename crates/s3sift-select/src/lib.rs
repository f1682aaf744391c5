//! S3 Select query construction and record stream relay.
//!
//! This library turns user filter criteria into an S3 Select SQL expression
//! over JSON Lines records and relays the service's record events, in
//! order, into an async output sink.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod criteria;
pub mod error;
pub mod event;
pub mod query;
pub mod relay;

pub use criteria::FilterCriteria;
pub use error::{BoxError, Error, Result, TimestampError};
pub use event::{EventStream, SelectEvent};
pub use query::{Query, QueryBuilder, build_query};
pub use relay::{RecordRelay, RelaySummary};
