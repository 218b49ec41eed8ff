//! # function-tools
//!
//! Turns an OpenAPI 3.x document into function schemas for LLM tool calling,
//! and executes the resulting function calls as HTTP requests.
//!
//! ```no_run
//! use function_tools::{FunctionCall, OpenApiProcessor, ProcessorSettings};
//! use openapi_parser::SpecSource;
//!
//! # async fn run() -> function_tools::Result<()> {
//! let settings = ProcessorSettings::new();
//! let processor = OpenApiProcessor::load(
//!     settings,
//!     Some(SpecSource::FromUrl("https://api.example.com/openapi.json".into())),
//! )
//! .await?;
//!
//! let call = FunctionCall::from_json_arguments("getFilm", r#"{"filmId": 7}"#)?;
//! let result = processor.execute(&call).await?;
//! println!("{}", result);
//! # Ok(())
//! # }
//! ```

pub mod call;
pub mod error;
pub mod processor;
pub mod schema;
pub mod settings;
pub mod tools;

#[cfg(test)]
mod test_support;

pub use call::{FunctionCall, FunctionCallOutput};
pub use error::{ConversionError, Result, ToolsError};
pub use processor::OpenApiProcessor;
pub use schema::{FunctionParameters, FunctionSchema, PropertySchema, SchemaType};
pub use settings::{ProcessorSettings, DEFAULT_FUNCTIONS_OUTPUT};
pub use tools::{
    CallExecutor, ConverterOptions, FunctionConverter, PreparedRequest, UnsupportedBodyPolicy,
    REQUEST_BODY_PARAMETER,
};
