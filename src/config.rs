use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::errors::Error;

/// Runtime knobs for the service: sequence counter names and cache TTLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub post_sequence: String,
    pub trace_sequence: String,
    /// TTL for the post entry written at creation time.
    pub post_create_ttl_secs: u64,
    /// TTL for the post entry repopulated on a read miss.
    pub post_read_ttl_secs: u64,
    /// TTL for cached trace-list pages.
    pub trace_list_ttl_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            post_sequence: "posts_sequence".to_string(),
            trace_sequence: "traces_sequence".to_string(),
            post_create_ttl_secs: 3600,
            post_read_ttl_secs: 1800,
            trace_list_ttl_secs: 600,
        }
    }
}

impl ServiceConfig {
    /// Loads the configuration from a TOML file.
    ///
    /// # Errors
    /// `Config` when the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Config(format!("read {}: {e}", path.as_ref().display())))?;
        toml::from_str(&raw).map_err(|e| Error::Config(e.to_string()))
    }

    #[must_use]
    pub fn post_create_ttl(&self) -> Duration {
        Duration::from_secs(self.post_create_ttl_secs)
    }

    #[must_use]
    pub fn post_read_ttl(&self) -> Duration {
        Duration::from_secs(self.post_read_ttl_secs)
    }

    #[must_use]
    pub fn trace_list_ttl(&self) -> Duration {
        Duration::from_secs(self.trace_list_ttl_secs)
    }

    /// Counter name for per-post trace versions.
    #[must_use]
    pub fn trace_sequence_for(&self, post_id: &str) -> String {
        format!("{}_{}", self.trace_sequence, post_id)
    }
}
