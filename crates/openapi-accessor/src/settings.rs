//! Accessor settings
//!
//! Defaults match the well-known FastAPI layout: the document lives at
//! `{base}/openapi.json` and the request gives up after five seconds.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::error::AccessResult;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
/// Default document location relative to the service base URL
pub const DEFAULT_SPEC_FILE: &str = "openapi.json";

/// Settings for fetching OpenAPI documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccessorSettings {
    /// Timeout for the whole request, in seconds
    pub request_timeout_secs: u64,
    /// Path appended to the base URL
    pub spec_file: String,
}

impl Default for AccessorSettings {
    fn default() -> Self {
        Self {
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            spec_file: DEFAULT_SPEC_FILE.to_string(),
        }
    }
}

impl AccessorSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Load settings from a JSON file, falling back to defaults if it is missing
    pub fn load_from_file(path: &Path) -> AccessResult<Self> {
        if !path.exists() {
            debug!("No accessor settings file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&contents)?;
        debug!("Loaded accessor settings from {:?}", path);
        Ok(settings)
    }
}
