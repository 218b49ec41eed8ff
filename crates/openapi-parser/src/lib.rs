//! # openapi-parser
//!
//! OpenAPI 3.x loader and parser.
//! Fetches specs from a URL or accepts in-memory documents, extracts
//! operations, and builds a route table for resolving function calls.

mod artifact;
mod error;
mod loader;
mod operations;
mod parser;
mod resolver;
mod routes;
mod types;

pub use artifact::write_json_artifact;
pub use error::{LoadError, LoadResult};
pub use loader::{LoadedSpec, SpecLoader, SpecSource, DEFAULT_RAW_SPEC_OUTPUT};
pub use operations::OperationExtractor;
pub use parser::OpenApiParser;
pub use routes::{RouteRef, RouteTable};
pub use types::*;
