//! Object store client configuration.
//!
//! Settings come from an optional YAML file and are overridden field by
//! field by command-line flags. Anything left unset falls through to the
//! AWS default provider chain (environment variables, shared config and
//! credentials files, instance metadata).
//!
//! ```yaml
//! region: eu-west-1
//! profile: logs-readonly
//! endpoint-url: http://localhost:9000
//! force-path-style: true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::{Error, Result};

/// Client settings for the object store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct ClientConfig {
    /// AWS region, e.g. `us-east-1`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Named profile from the shared AWS config files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// Custom endpoint for S3-compatible stores.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,

    /// Address buckets as `endpoint/bucket` instead of `bucket.endpoint`.
    /// Unset means virtual-hosted style.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_path_style: Option<bool>,
}

impl ClientConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and
    /// [`Error::Config`] if it is not valid configuration YAML.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        Self::from_yaml(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse configuration from YAML text.
    ///
    /// An empty document yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on malformed YAML or unknown keys.
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Apply overrides, keeping the current value wherever the override is
    /// unset.
    #[must_use]
    pub fn merged_with(self, overrides: ClientConfig) -> Self {
        Self {
            region: overrides.region.or(self.region),
            profile: overrides.profile.or(self.profile),
            endpoint_url: overrides.endpoint_url.or(self.endpoint_url),
            force_path_style: overrides.force_path_style.or(self.force_path_style),
        }
    }
}
