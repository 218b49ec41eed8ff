//! Convert a remote OpenAPI spec and list the resulting functions
//!
//! ```sh
//! cargo run -p function-tools --example convert_spec -- https://petstore3.swagger.io/api/v3/openapi.json
//! ```

use function_tools::{OpenApiProcessor, ProcessorSettings};
use openapi_parser::SpecSource;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let spec_url = std::env::args()
        .nth(1)
        .ok_or("usage: convert_spec <spec-url>")?;

    let mut settings = ProcessorSettings::new();
    settings.strict = false;

    let processor = OpenApiProcessor::load(settings, Some(SpecSource::FromUrl(spec_url))).await?;

    println!("{} v{}", processor.spec().title, processor.spec().version);
    for function in processor.functions() {
        let required = function.parameters.required.join(", ");
        println!("  {}({}) - {}", function.name, required, function.description);
    }

    Ok(())
}
