//! openapi-functions CLI
//!
//! Converts an OpenAPI document into function schemas and optionally
//! executes one function call against the API. Logs go to stderr so that
//! `--print` and `--call` output on stdout stays machine-readable.

use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use function_tools::{FunctionCall, OpenApiProcessor, ProcessorSettings, UnsupportedBodyPolicy};
use openapi_parser::{OpenApiParser, SpecSource};

/// Convert OpenAPI operations into LLM function schemas
#[derive(Parser, Debug)]
#[command(name = "openapi-functions")]
#[command(author = "Symbia Labs")]
#[command(version = "0.1.0")]
#[command(about = "Convert OpenAPI specs into LLM function schemas and execute function calls")]
struct Args {
    /// URL of the OpenAPI document
    #[arg(long, env = "OPENAPI_SPEC_URL")]
    spec_url: Option<String>,

    /// Local OpenAPI document (JSON or YAML), used instead of --spec-url
    #[arg(long)]
    spec_file: Option<PathBuf>,

    /// Base API URL (defaults to the spec's first server)
    #[arg(long, env = "OPENAPI_BASE_URL")]
    base_url: Option<String>,

    /// Keep optional query parameters optional and nullable
    #[arg(long)]
    no_strict: bool,

    /// Handling of request bodies without a JSON media type: reject or skip
    #[arg(long)]
    unsupported_body: Option<UnsupportedBodyPolicy>,

    /// Where to write the function schemas
    #[arg(long)]
    functions_out: Option<PathBuf>,

    /// Where to write the downloaded spec
    #[arg(long)]
    raw_spec_out: Option<PathBuf>,

    /// Settings file (defaults to the platform config directory)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Print the function schemas to stdout
    #[arg(long)]
    print: bool,

    /// Execute this function after loading
    #[arg(long)]
    call: Option<String>,

    /// JSON arguments for --call
    #[arg(long, default_value = "{}")]
    args: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let mut settings = match args.settings.clone().or_else(ProcessorSettings::default_path) {
        Some(path) => ProcessorSettings::load(&path)
            .map_err(|e| format!("Failed to load settings from {:?}: {}", path, e))?,
        None => ProcessorSettings::new(),
    };

    // Flags override the settings file
    if let Some(url) = args.spec_url {
        settings.spec_url = Some(url);
    }
    if let Some(url) = args.base_url {
        settings.base_url = Some(url);
    }
    if args.no_strict {
        settings.strict = false;
    }
    if let Some(policy) = args.unsupported_body {
        settings.unsupported_body = policy;
    }
    if let Some(path) = args.functions_out {
        settings.functions_output = Some(path);
    }
    if let Some(path) = args.raw_spec_out {
        settings.raw_spec_output = Some(path);
    }

    let source = match args.spec_file {
        Some(path) => {
            let content = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| format!("Failed to read {:?}: {}", path, e))?;
            Some(SpecSource::FromDocument(OpenApiParser::parse_document_text(
                &content,
            )?))
        }
        None => None,
    };

    let processor = OpenApiProcessor::load(settings, source).await?;

    if args.print {
        println!("{}", serde_json::to_string_pretty(processor.functions())?);
    }

    if let Some(name) = args.call {
        let call = FunctionCall::from_json_arguments(name, &args.args)?;
        let result = processor.execute(&call).await?;
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if !args.print {
        for function in processor.functions() {
            info!("{}: {}", function.name, function.description);
        }
    }

    Ok(())
}
