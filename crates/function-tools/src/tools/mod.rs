//! Function schema conversion and call execution

mod converter;
mod executor;

pub use converter::{
    ConverterOptions, FunctionConverter, UnsupportedBodyPolicy, REQUEST_BODY_PARAMETER,
};
pub use executor::{CallExecutor, PreparedRequest};
