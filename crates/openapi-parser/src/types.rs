//! Type definitions for parsed OpenAPI specs

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::routes::RouteTable;

/// HTTP methods supported by OpenAPI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Trace,
}

impl HttpMethod {
    /// Every method, in the order operations are visited within a path item
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Head,
        HttpMethod::Options,
        HttpMethod::Trace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// Whether a request body on this method is exposed to function callers
    pub fn accepts_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parameter location in HTTP request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl ParameterLocation {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "path" => Some(ParameterLocation::Path),
            "query" => Some(ParameterLocation::Query),
            "header" => Some(ParameterLocation::Header),
            "cookie" => Some(ParameterLocation::Cookie),
            _ => None,
        }
    }
}

/// A parameter for an API operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationParameter {
    /// Parameter name
    pub name: String,
    /// Where the parameter is located
    pub location: ParameterLocation,
    /// Required flag as declared by the source document
    pub required: bool,
    /// Parameter description
    pub description: Option<String>,
    /// JSON Schema for the parameter, with `$ref`s resolved
    pub schema: Option<serde_json::Value>,
    /// Whether the parameter is deprecated
    pub deprecated: bool,
}

/// Request body, keeping every declared media type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestBody {
    /// Whether the body is required
    pub required: bool,
    /// Description
    pub description: Option<String>,
    /// Resolved schema per media type, in declaration order
    pub content: IndexMap<String, Option<serde_json::Value>>,
}

impl RequestBody {
    /// First JSON media type and its schema, if the body offers one
    pub fn json_content(&self) -> Option<(&str, Option<&serde_json::Value>)> {
        self.content
            .iter()
            .find(|(media_type, _)| is_json_media_type(media_type))
            .map(|(media_type, schema)| (media_type.as_str(), schema.as_ref()))
    }

    /// All declared media types
    pub fn media_types(&self) -> Vec<String> {
        self.content.keys().cloned().collect()
    }
}

/// `application/json` (with optional parameters) or any `+json` structured suffix
pub fn is_json_media_type(media_type: &str) -> bool {
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

/// A single API operation extracted from the spec
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiOperation {
    /// Operation ID (from spec or generated)
    pub operation_id: String,
    /// HTTP method
    pub method: HttpMethod,
    /// URL path template (e.g., "/films/{filmId}")
    pub path: String,
    /// Short summary
    pub summary: Option<String>,
    /// Full description
    pub description: Option<String>,
    /// Tags for categorization
    pub tags: Vec<String>,
    /// Whether the operation is deprecated
    pub deprecated: bool,
    /// Parameters (path, query, header, cookie)
    pub parameters: Vec<OperationParameter>,
    /// Request body
    pub request_body: Option<RequestBody>,
}

impl ApiOperation {
    /// Parameters declared at the given location, in declaration order
    pub fn parameters_in(
        &self,
        location: ParameterLocation,
    ) -> impl Iterator<Item = &OperationParameter> {
        self.parameters
            .iter()
            .filter(move |p| p.location == location)
    }
}

/// Parsed OpenAPI specification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedSpec {
    /// Declared OpenAPI version (e.g., "3.0.3")
    pub openapi_version: String,
    /// API title
    pub title: String,
    /// API description
    pub description: Option<String>,
    /// API version
    pub version: String,
    /// Server URLs
    pub servers: Vec<ServerInfo>,
    /// All extracted operations, in path order then method order
    pub operations: Vec<ApiOperation>,
    /// Lookup table from function name to route, built once at parse time
    pub routes: RouteTable,
}

impl ParsedSpec {
    /// Operation referenced by a route's index
    pub fn operation(&self, index: usize) -> Option<&ApiOperation> {
        self.operations.get(index)
    }
}

/// Server information from the spec
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Server URL
    pub url: String,
    /// Server description
    pub description: Option<String>,
}

// --- Raw OpenAPI 3.x structures for parsing ---

/// Raw OpenAPI document structure
#[derive(Debug, Clone, Deserialize)]
pub struct RawOpenApiSpec {
    pub openapi: Option<String>,
    /// Present on Swagger 2.0 documents, which are rejected
    pub swagger: Option<String>,
    #[serde(default)]
    pub info: RawInfo,
    #[serde(default)]
    pub servers: Vec<RawServer>,
    #[serde(default)]
    pub paths: IndexMap<String, RawPathItem>,
    #[serde(default)]
    pub components: Option<RawComponents>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawInfo {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawServer {
    pub url: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPathItem {
    pub get: Option<RawOperation>,
    pub post: Option<RawOperation>,
    pub put: Option<RawOperation>,
    pub delete: Option<RawOperation>,
    pub patch: Option<RawOperation>,
    pub head: Option<RawOperation>,
    pub options: Option<RawOperation>,
    pub trace: Option<RawOperation>,
    #[serde(default)]
    pub parameters: Vec<RawParameter>,
}

impl RawPathItem {
    pub fn operation(&self, method: HttpMethod) -> Option<&RawOperation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Trace => self.trace.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOperation {
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub parameters: Vec<RawParameter>,
    pub request_body: Option<RawRequestBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawParameter {
    /// Parameter name (optional when $ref is used)
    #[serde(default)]
    pub name: String,
    /// Parameter location (optional when $ref is used)
    #[serde(rename = "in", default)]
    pub location: String,
    #[serde(default)]
    pub required: bool,
    pub description: Option<String>,
    pub schema: Option<serde_json::Value>,
    #[serde(default)]
    pub deprecated: bool,
    /// Reference to a parameter in components/parameters
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
}

impl RawParameter {
    pub fn location(&self) -> Option<ParameterLocation> {
        ParameterLocation::parse(&self.location)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRequestBody {
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub content: IndexMap<String, RawMediaType>,
    /// Reference to a body in components/requestBodies
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMediaType {
    pub schema: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawComponents {
    #[serde(default)]
    pub schemas: IndexMap<String, serde_json::Value>,
    #[serde(default)]
    pub parameters: IndexMap<String, RawParameter>,
    #[serde(default)]
    pub request_bodies: IndexMap<String, RawRequestBody>,
}
