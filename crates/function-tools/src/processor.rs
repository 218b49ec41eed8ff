//! End-to-end processing: load a spec, convert it, execute calls

use openapi_parser::{write_json_artifact, LoadedSpec, ParsedSpec, SpecLoader, SpecSource};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

use crate::call::FunctionCall;
use crate::error::{Result, ToolsError};
use crate::schema::FunctionSchema;
use crate::settings::ProcessorSettings;
use crate::tools::{CallExecutor, ConverterOptions, FunctionConverter, PreparedRequest};

/// A loaded API: its document, function schemas, and an executor for calls
pub struct OpenApiProcessor {
    settings: ProcessorSettings,
    document: Value,
    spec: Arc<ParsedSpec>,
    functions: Vec<FunctionSchema>,
    executor: Option<CallExecutor>,
}

impl OpenApiProcessor {
    /// Load a spec and convert it
    ///
    /// An explicit `source` wins over `settings.spec_url`.
    pub async fn load(settings: ProcessorSettings, source: Option<SpecSource>) -> Result<Self> {
        let source = source.or_else(|| settings.spec_url.clone().map(SpecSource::FromUrl));

        let loader = SpecLoader::with_timeout(settings.request_timeout())?
            .with_raw_output(settings.raw_spec_output.clone());
        let loaded = loader.load_optional(source).await?;

        Self::from_loaded(settings, loaded).await
    }

    /// Convert an already-loaded spec
    pub async fn from_loaded(settings: ProcessorSettings, loaded: LoadedSpec) -> Result<Self> {
        let base_url = match settings.parsed_base_url()? {
            Some(url) => Some(url),
            None => loaded.server_url(),
        };

        let spec = Arc::new(loaded.spec);
        let functions = FunctionConverter::new(settings.converter_options()).convert(&spec)?;
        info!("Converted {} functions from {}", functions.len(), spec.title);

        if let Some(path) = &settings.functions_output {
            write_json_artifact(path, &functions)
                .await
                .map_err(|source| ToolsError::ArtifactError {
                    path: path.clone(),
                    source,
                })?;
            info!("Functions saved to {:?}", path);
        }

        let executor = match base_url {
            Some(url) => Some(CallExecutor::with_timeout(
                spec.clone(),
                url,
                settings.request_timeout(),
            )?),
            None => {
                warn!("No base URL configured and no server declared; calls are disabled");
                None
            }
        };

        Ok(Self {
            settings,
            document: loaded.document,
            spec,
            functions,
            executor,
        })
    }

    pub fn settings(&self) -> &ProcessorSettings {
        &self.settings
    }

    /// Raw document as loaded
    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn spec(&self) -> &Arc<ParsedSpec> {
        &self.spec
    }

    /// Function schemas produced at load time
    pub fn functions(&self) -> &[FunctionSchema] {
        &self.functions
    }

    pub fn function(&self, name: &str) -> Option<&FunctionSchema> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Re-run conversion with different options; the stored list is unchanged
    pub fn convert(&self, options: ConverterOptions) -> Result<Vec<FunctionSchema>> {
        Ok(FunctionConverter::new(options).convert(&self.spec)?)
    }

    /// Base URL calls are resolved against, if one is known
    pub fn base_url(&self) -> Option<&Url> {
        self.executor.as_ref().map(CallExecutor::base_url)
    }

    pub fn prepare(&self, call: &FunctionCall) -> Result<PreparedRequest> {
        self.executor()?.prepare(call)
    }

    /// Execute a function call against the API
    pub async fn execute(&self, call: &FunctionCall) -> Result<Value> {
        self.executor()?.execute(call).await
    }

    fn executor(&self) -> Result<&CallExecutor> {
        self.executor.as_ref().ok_or(ToolsError::MissingBaseUrl)
    }
}
