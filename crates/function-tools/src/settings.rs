//! Processor settings management
//!
//! Settings live in a plain camelCase JSON file. A missing file yields the
//! defaults; command-line flags override whatever the file holds.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::{Result, ToolsError};
use crate::tools::{ConverterOptions, UnsupportedBodyPolicy};

/// Default path for the generated function list
pub const DEFAULT_FUNCTIONS_OUTPUT: &str = "openai_functions.json";

/// Processor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessorSettings {
    /// Settings file version
    pub version: u32,
    /// URL of the OpenAPI document
    pub spec_url: Option<String>,
    /// Base API URL; falls back to the spec's first server
    pub base_url: Option<String>,
    /// Require all query parameters and skip nullable widening
    pub strict: bool,
    /// Handling of request bodies with no JSON media type
    pub unsupported_body: UnsupportedBodyPolicy,
    /// Where a downloaded spec is copied (None disables the copy)
    pub raw_spec_output: Option<PathBuf>,
    /// Where converted functions are written (None disables the write)
    pub functions_output: Option<PathBuf>,
    /// Timeout for each HTTP request, in seconds
    pub request_timeout_secs: u64,
}

impl Default for ProcessorSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessorSettings {
    /// Create default settings
    pub fn new() -> Self {
        Self {
            version: 1,
            spec_url: None,
            base_url: None,
            strict: true,
            unsupported_body: UnsupportedBodyPolicy::Reject,
            raw_spec_output: Some(PathBuf::from(openapi_parser::DEFAULT_RAW_SPEC_OUTPUT)),
            functions_output: Some(PathBuf::from(DEFAULT_FUNCTIONS_OUTPUT)),
            request_timeout_secs: 30,
        }
    }

    /// Platform config location, e.g. `~/.config/openapi-functions/settings.json`
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "symbia-labs", "openapi-functions")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from file, using defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings file at {:?}, using defaults", path);
            return Ok(Self::new());
        }

        let contents = std::fs::read_to_string(path)?;
        let settings: ProcessorSettings = serde_json::from_str(&contents)?;
        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Save settings to file
    pub async fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write atomically using temp file
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents).await?;
        tokio::fs::rename(&temp_path, path).await?;

        debug!("Saved settings to {:?}", path);
        Ok(())
    }

    pub fn converter_options(&self) -> ConverterOptions {
        ConverterOptions {
            strict: self.strict,
            unsupported_body: self.unsupported_body,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Parse the configured base URL, if any
    pub fn parsed_base_url(&self) -> Result<Option<Url>> {
        self.base_url
            .as_deref()
            .map(|raw| {
                Url::parse(raw).map_err(|e| ToolsError::InvalidBaseUrl {
                    url: raw.to_string(),
                    message: e.to_string(),
                })
            })
            .transpose()
    }
}
