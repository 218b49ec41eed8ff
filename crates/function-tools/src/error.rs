//! Error types for function-tools

use openapi_parser::LoadError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for function-tools operations
pub type Result<T> = std::result::Result<T, ToolsError>;

/// Errors raised while converting operations into function schemas
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Operation {operation_id} has a request body without a JSON media type (offered: {})", .media_types.join(", "))]
    UnsupportedMediaType {
        operation_id: String,
        media_types: Vec<String>,
    },
}

/// Function-tools error types
#[derive(Error, Debug)]
pub enum ToolsError {
    #[error("Failed to load OpenAPI spec: {0}")]
    Load(#[from] LoadError),

    #[error("Conversion failed: {0}")]
    Conversion(#[from] ConversionError),

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Invalid arguments for {function}: {message}")]
    InvalidArguments { function: String, message: String },

    #[error("No base API URL configured and the spec declares no usable server")]
    MissingBaseUrl,

    #[error("Invalid base URL {url}: {message}")]
    InvalidBaseUrl { url: String, message: String },

    #[error("HTTP {status} from {url} while calling {function}: {body}")]
    RemoteCall {
        function: String,
        url: String,
        status: u16,
        body: String,
    },

    #[error("HTTP request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Response from {url} is not valid JSON: {message}")]
    InvalidResponse { url: String, message: String },

    #[error("Failed to write {}: {source}", .path.display())]
    ArtifactError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
