//! Resolve a function call to a URL, then execute it
//!
//! ```sh
//! cargo run -p function-tools --example call_function -- \
//!     https://petstore3.swagger.io/api/v3/openapi.json getPetById '{"petId": 1}'
//! ```

use function_tools::{FunctionCall, FunctionCallOutput, OpenApiProcessor, ProcessorSettings};
use openapi_parser::SpecSource;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let usage = "usage: call_function <spec-url> <function> [json-arguments]";
    let spec_url = args.next().ok_or(usage)?;
    let name = args.next().ok_or(usage)?;
    let arguments = args.next().unwrap_or_else(|| "{}".to_string());

    let mut settings = ProcessorSettings::new();
    settings.functions_output = None;

    let processor = OpenApiProcessor::load(settings, Some(SpecSource::FromUrl(spec_url))).await?;

    let call = FunctionCall::from_json_arguments(name, &arguments)?.with_call_id("demo_call");
    let prepared = processor.prepare(&call)?;
    println!("{} {}", prepared.method, prepared.url);

    let result = processor.execute(&call).await?;
    let output = FunctionCallOutput::new(call.call_id.as_deref().unwrap_or_default(), &result);
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
