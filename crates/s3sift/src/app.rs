//! Application context for running a filter.
//!
//! The `App` owns the select service handle for one invocation and runs
//! the filter against it.
//!
//! # Example
//!
//! ```no_run
//! use s3sift::app::App;
//! use s3sift::config::ClientConfig;
//! use s3sift::locator::ObjectLocator;
//! use s3sift_select::{FilterCriteria, build_query};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::from_config(&ClientConfig::default()).await?;
//!     let locator = ObjectLocator::parse("s3://logs/app.jsonl.gz")?;
//!     let query = build_query(&FilterCriteria::new().with_word("timeout"))?;
//!     app.filter(locator, query, &mut tokio::io::stdout()).await?;
//!     Ok(())
//! }
//! ```

use s3sift_select::{Query, RelaySummary};
use tokio::io::AsyncWrite;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::filter::RecordStreamFilter;
use crate::locator::ObjectLocator;
use crate::service::{SelectService, create_service};

/// Application context for CLI operations.
pub struct App {
    /// The select service (trait object for polymorphism)
    service: Box<dyn SelectService>,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("service", &"<dyn SelectService>")
            .finish()
    }
}

impl App {
    /// Create an App backed by the AWS select service.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be constructed, for example
    /// when no region is configured.
    pub async fn from_config(config: &ClientConfig) -> Result<Self> {
        let service = create_service(config).await?;
        Ok(Self::with_service(service))
    }

    /// Create an App around an existing service.
    pub fn with_service(service: Box<dyn SelectService>) -> Self {
        Self { service }
    }

    /// Get the select service.
    pub fn service(&self) -> &dyn SelectService {
        self.service.as_ref()
    }

    /// Run `query` against `locator`, writing matching records to `sink`.
    ///
    /// # Errors
    ///
    /// See [`RecordStreamFilter::run`].
    pub async fn filter<W>(
        &self,
        locator: ObjectLocator,
        query: Query,
        sink: &mut W,
    ) -> Result<RelaySummary>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        RecordStreamFilter::new(locator, query)
            .run(self.service(), sink)
            .await
    }
}
