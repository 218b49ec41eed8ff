//! Main OpenAPI parser

use crate::error::{LoadError, LoadResult};
use crate::operations::OperationExtractor;
use crate::routes::RouteTable;
use crate::types::*;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// OpenAPI 3.x parser
pub struct OpenApiParser;

impl OpenApiParser {
    /// Parse an OpenAPI spec from a string (auto-detects JSON/YAML)
    pub fn parse(content: &str) -> LoadResult<ParsedSpec> {
        let document = Self::parse_document_text(content)?;
        Self::parse_document(&document)
    }

    /// Parse spec text into a raw JSON document (auto-detects JSON/YAML)
    pub fn parse_document_text(content: &str) -> LoadResult<Value> {
        if content.trim_start().starts_with('{') {
            Ok(serde_json::from_str(content)?)
        } else {
            Self::parse_yaml_document(content)
        }
    }

    /// Parse YAML spec text into a raw JSON document
    pub fn parse_yaml_document(content: &str) -> LoadResult<Value> {
        let content = Self::sanitize_large_numbers(content);
        let document: Value = serde_yaml::from_str(&content)?;
        if !document.is_object() {
            return Err(LoadError::InvalidFormat(
                "spec document is not a mapping".to_string(),
            ));
        }
        Ok(document)
    }

    /// Parse an already-decoded JSON document
    pub fn parse_document(document: &Value) -> LoadResult<ParsedSpec> {
        if !document.is_object() {
            return Err(LoadError::InvalidFormat(
                "spec document is not a JSON object".to_string(),
            ));
        }
        let raw = RawOpenApiSpec::deserialize(document)
            .map_err(|e| LoadError::InvalidFormat(e.to_string()))?;
        Self::convert_spec(raw)
    }

    /// Some specs use integers far outside i64 for min/max bounds, which
    /// serde_yaml rejects; the exact bound does not matter for tool calling
    fn sanitize_large_numbers(content: &str) -> String {
        let re_large = match Regex::new(
            r"(?m)^(\s*(?:minimum|maximum|exclusiveMinimum|exclusiveMaximum):\s*)(-?\d{16,})",
        ) {
            Ok(re) => re,
            Err(_) => return content.to_string(),
        };

        re_large
            .replace_all(content, |caps: &regex::Captures| {
                let prefix = &caps[1];
                if caps[2].starts_with('-') {
                    format!("{}-2147483648", prefix)
                } else {
                    format!("{}2147483647", prefix)
                }
            })
            .into_owned()
    }

    /// Convert a raw OpenAPI spec to our internal format
    fn convert_spec(raw: RawOpenApiSpec) -> LoadResult<ParsedSpec> {
        let openapi_version = match (&raw.openapi, &raw.swagger) {
            (Some(version), _) if version.starts_with("3.") => version.clone(),
            (Some(version), _) => return Err(LoadError::UnsupportedVersion(version.clone())),
            (None, Some(swagger)) => {
                return Err(LoadError::UnsupportedVersion(format!("swagger {}", swagger)))
            }
            (None, None) => {
                return Err(LoadError::UnsupportedVersion(
                    "missing openapi version field".to_string(),
                ))
            }
        };

        debug!("Parsing OpenAPI {} spec: {}", openapi_version, raw.info.title);

        let operations = OperationExtractor::extract(&raw);
        let routes = RouteTable::build(&operations);

        debug!(
            "Extracted {} operations ({} routes)",
            operations.len(),
            routes.len()
        );

        let servers = raw
            .servers
            .iter()
            .map(|s| ServerInfo {
                url: s.url.clone(),
                description: s.description.clone(),
            })
            .collect();

        Ok(ParsedSpec {
            openapi_version,
            title: raw.info.title,
            description: raw.info.description,
            version: raw.info.version,
            servers,
            operations,
            routes,
        })
    }
}
