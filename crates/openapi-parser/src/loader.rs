//! Spec loading from a URL or an in-memory document

use reqwest::Client;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::artifact::write_json_artifact;
use crate::error::{LoadError, LoadResult};
use crate::parser::OpenApiParser;
use crate::types::ParsedSpec;

/// Default path for the downloaded spec copy
pub const DEFAULT_RAW_SPEC_OUTPUT: &str = "openapi-schema-raw.json";

/// Where an OpenAPI document comes from
#[derive(Debug, Clone)]
pub enum SpecSource {
    /// Fetch the document over HTTP(S)
    FromUrl(String),
    /// Use an already-decoded document
    FromDocument(Value),
}

/// A loaded document: the raw JSON alongside its parsed form
#[derive(Debug, Clone)]
pub struct LoadedSpec {
    /// Raw document as received
    pub document: Value,
    /// Parsed operations and route table
    pub spec: ParsedSpec,
    /// URL the document was fetched from, if any
    pub spec_url: Option<Url>,
}

impl LoadedSpec {
    /// First declared server, resolved against the spec URL when relative
    pub fn server_url(&self) -> Option<Url> {
        let server = self.spec.servers.first()?;
        match Url::parse(&server.url) {
            Ok(url) => Some(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                self.spec_url.as_ref()?.join(&server.url).ok()
            }
            Err(e) => {
                debug!("Ignoring unusable server URL {}: {}", server.url, e);
                None
            }
        }
    }
}

/// Loads OpenAPI documents and keeps a copy of downloaded ones on disk
pub struct SpecLoader {
    client: Client,
    raw_output: Option<PathBuf>,
}

impl SpecLoader {
    /// Create a loader with a 30 second request timeout
    pub fn new() -> LoadResult<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create a loader with a caller-supplied request timeout
    pub fn with_timeout(timeout: Duration) -> LoadResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LoadError::HttpError(e.to_string()))?;

        Ok(Self::with_client(client))
    }

    /// Create a loader around an existing HTTP client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            raw_output: Some(PathBuf::from(DEFAULT_RAW_SPEC_OUTPUT)),
        }
    }

    /// Set where downloaded specs are saved (`None` disables the copy)
    pub fn with_raw_output(mut self, path: Option<PathBuf>) -> Self {
        self.raw_output = path;
        self
    }

    /// Load from a source, failing if none was configured
    pub async fn load_optional(&self, source: Option<SpecSource>) -> LoadResult<LoadedSpec> {
        match source {
            Some(source) => self.load(source).await,
            None => Err(LoadError::MissingSource),
        }
    }

    /// Load and parse a document
    pub async fn load(&self, source: SpecSource) -> LoadResult<LoadedSpec> {
        match source {
            SpecSource::FromUrl(raw_url) => {
                let url = Url::parse(&raw_url)
                    .map_err(|e| LoadError::InvalidUrl(format!("{}: {}", raw_url, e)))?;

                let document = self.fetch_document(&url).await?;
                let spec = OpenApiParser::parse_document(&document)?;

                if let Some(path) = &self.raw_output {
                    write_json_artifact(path, &document)
                        .await
                        .map_err(|source| LoadError::ArtifactError {
                            path: path.clone(),
                            source,
                        })?;
                    info!("OpenAPI spec downloaded and saved to {:?}", path);
                }

                Ok(LoadedSpec {
                    document,
                    spec,
                    spec_url: Some(url),
                })
            }
            SpecSource::FromDocument(document) => {
                let spec = OpenApiParser::parse_document(&document)?;
                Ok(LoadedSpec {
                    document,
                    spec,
                    spec_url: None,
                })
            }
        }
    }

    /// Fetch a spec document over HTTP without parsing operations
    pub async fn fetch_document(&self, url: &Url) -> LoadResult<Value> {
        info!("Fetching OpenAPI spec from: {}", url);

        let response = self
            .client
            .get(url.clone())
            .header("Accept", "application/json, application/yaml, text/yaml")
            .send()
            .await
            .map_err(|e| LoadError::FetchError {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .unwrap_or_default();

        let content = response.text().await.map_err(|e| LoadError::FetchError {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let path = url.path();
        if content_type.contains("yaml") || path.ends_with(".yaml") || path.ends_with(".yml") {
            OpenApiParser::parse_yaml_document(&content)
        } else {
            OpenApiParser::parse_document_text(&content)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};
    use serde_json::json;
    use tempfile::TempDir;

    fn film_spec() -> Value {
        json!({
            "openapi": "3.0.3",
            "info": {"title": "Films", "version": "1"},
            "servers": [{"url": "/api/v1"}],
            "paths": {
                "/films": {"get": {"operationId": "listFilms"}}
            }
        })
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_load_from_url_persists_raw_copy() {
        let app = Router::new().route("/openapi.json", get(|| async { axum::Json(film_spec()) }));
        let base = serve(app).await;
        let temp_dir = TempDir::new().unwrap();
        let raw_path = temp_dir.path().join("raw.json");

        let loader = SpecLoader::new()
            .unwrap()
            .with_raw_output(Some(raw_path.clone()));
        let loaded = loader
            .load(SpecSource::FromUrl(format!("{}/openapi.json", base)))
            .await
            .unwrap();

        assert_eq!(loaded.spec.operations.len(), 1);
        let saved: Value =
            serde_json::from_str(&std::fs::read_to_string(&raw_path).unwrap()).unwrap();
        assert_eq!(saved, film_spec());
        assert_eq!(
            loaded.server_url().unwrap().as_str(),
            format!("{}/api/v1", base)
        );
    }

    #[tokio::test]
    async fn test_load_yaml_from_url() {
        let yaml = "openapi: 3.0.0\ninfo:\n  title: Y\n  version: '1'\npaths:\n  /a:\n    get:\n      operationId: getA\n";
        let app = Router::new().route("/spec.yaml", get(move || async move { yaml }));
        let base = serve(app).await;

        let loader = SpecLoader::new().unwrap().with_raw_output(None);
        let loaded = loader
            .load(SpecSource::FromUrl(format!("{}/spec.yaml", base)))
            .await
            .unwrap();

        assert_eq!(loaded.spec.operations[0].operation_id, "getA");
    }

    #[tokio::test]
    async fn test_load_http_error() {
        let app = Router::new().route("/missing", get(|| async { StatusCode::NOT_FOUND }));
        let base = serve(app).await;

        let loader = SpecLoader::new().unwrap().with_raw_output(None);
        let result = loader
            .load(SpecSource::FromUrl(format!("{}/missing", base)))
            .await;

        match result {
            Err(LoadError::HttpStatus { status, url }) => {
                assert_eq!(status, 404);
                assert!(url.ends_with("/missing"));
            }
            other => panic!("Expected HttpStatus error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_load_unparseable_body() {
        let app = Router::new().route("/broken", get(|| async { "{ not json" }));
        let base = serve(app).await;

        let loader = SpecLoader::new().unwrap().with_raw_output(None);
        let result = loader
            .load(SpecSource::FromUrl(format!("{}/broken", base)))
            .await;

        assert!(matches!(result, Err(LoadError::JsonError(_))));
    }

    #[tokio::test]
    async fn test_load_from_document_skips_fetch() {
        let temp_dir = TempDir::new().unwrap();
        let raw_path = temp_dir.path().join("raw.json");

        let loader = SpecLoader::new()
            .unwrap()
            .with_raw_output(Some(raw_path.clone()));
        let loaded = loader
            .load(SpecSource::FromDocument(film_spec()))
            .await
            .unwrap();

        assert!(loaded.spec_url.is_none());
        assert!(loaded.server_url().is_none());
        assert!(!raw_path.exists());
    }

    #[tokio::test]
    async fn test_missing_source() {
        let loader = SpecLoader::new().unwrap();
        let result = loader.load_optional(None).await;
        assert!(matches!(result, Err(LoadError::MissingSource)));
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let loader = SpecLoader::new().unwrap();
        let result = loader
            .load(SpecSource::FromUrl("not a url".to_string()))
            .await;
        assert!(matches!(result, Err(LoadError::InvalidUrl(_))));
    }
}
