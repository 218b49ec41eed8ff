//! Error types for loading and parsing OpenAPI specs

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for loader and parser operations
pub type LoadResult<T> = std::result::Result<T, LoadError>;

/// Loader error types
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("No OpenAPI spec source - provide a spec URL or an in-memory document")]
    MissingSource,

    #[error("Failed to fetch OpenAPI spec from {url}: {message}")]
    FetchError { url: String, message: String },

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Invalid OpenAPI spec format: {0}")]
    InvalidFormat(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(String),

    #[error("Failed to write {}: {source}", .path.display())]
    ArtifactError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),
}
