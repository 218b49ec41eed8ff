//! Execute function calls by making HTTP requests

use openapi_parser::{HttpMethod, ParsedSpec, RouteRef};
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};
use url::{form_urlencoded, Url};

use crate::call::FunctionCall;
use crate::error::{Result, ToolsError};

/// Longest response body kept in a `RemoteCall` error
const MAX_ERROR_BODY_CHARS: usize = 1024;

/// A resolved request, ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    /// Function that produced the request
    pub function: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Final URL including the query string
    pub url: Url,
}

/// Executor for function calls against the API described by a spec
///
/// Only GET operations are executable. Calls naming an operation that exists
/// solely under another method fail with `ToolsError::UnknownFunction`.
pub struct CallExecutor {
    /// Shared parsed spec
    spec: Arc<ParsedSpec>,
    /// Base API URL paths are resolved against
    base_url: Url,
    /// HTTP client
    client: Client,
}

impl CallExecutor {
    /// Create a new executor with a 30 second request timeout
    pub fn new(spec: Arc<ParsedSpec>, base_url: Url) -> Result<Self> {
        Self::with_timeout(spec, base_url, Duration::from_secs(30))
    }

    /// Create a new executor with a caller-supplied request timeout
    pub fn with_timeout(spec: Arc<ParsedSpec>, base_url: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ToolsError::Transport {
                url: base_url.to_string(),
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self::with_client(spec, base_url, client))
    }

    /// Create a new executor around an existing HTTP client
    pub fn with_client(spec: Arc<ParsedSpec>, base_url: Url, client: Client) -> Self {
        Self {
            spec,
            base_url,
            client,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a function name to its GET route
    pub fn resolve(&self, name: &str) -> Result<&RouteRef> {
        self.spec
            .routes
            .lookup(HttpMethod::Get, name)
            .ok_or_else(|| {
                let methods = self.spec.routes.methods_for(name);
                if !methods.is_empty() {
                    debug!(
                        "{} is defined for {:?}, but only GET operations are executable",
                        name, methods
                    );
                }
                ToolsError::UnknownFunction(name.to_string())
            })
    }

    /// Resolve a call into its final URL without sending it
    pub fn prepare(&self, call: &FunctionCall) -> Result<PreparedRequest> {
        let route = self.resolve(&call.name)?;

        let mut path = route.path.clone();
        let mut query: Vec<(String, String)> = Vec::new();

        for (name, value) in &call.arguments {
            let placeholder = format!("{{{}}}", name);
            if path.contains(&placeholder) {
                let raw = scalar_to_string(value).ok_or_else(|| ToolsError::InvalidArguments {
                    function: call.name.clone(),
                    message: format!("path parameter {} cannot be null", name),
                })?;
                path = path.replace(&placeholder, &encode_path_segment(&raw));
            } else {
                push_query_values(&mut query, name, value);
            }
        }

        if let Some(missing) = unfilled_placeholder(&path) {
            return Err(ToolsError::InvalidArguments {
                function: call.name.clone(),
                message: format!("missing path parameter {}", missing),
            });
        }

        let mut url = self
            .base_url
            .join(&path)
            .map_err(|e| ToolsError::InvalidArguments {
                function: call.name.clone(),
                message: format!("cannot resolve path {} against {}: {}", path, self.base_url, e),
            })?;

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        Ok(PreparedRequest {
            function: call.name.clone(),
            method: route.method,
            url,
        })
    }

    /// Execute a function call and return the parsed JSON response
    pub async fn execute(&self, call: &FunctionCall) -> Result<Value> {
        let prepared = self.prepare(call)?;
        let url = prepared.url.to_string();

        info!("Executing {} -> {} {}", call.name, prepared.method, url);

        let response = self
            .client
            .get(prepared.url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ToolsError::Transport {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| ToolsError::Transport {
            url: url.clone(),
            message: format!("failed to read response: {}", e),
        })?;

        debug!("Response status: {}", status);

        if !status.is_success() {
            error!("Request failed with status {}: {}", status, response_text);
            return Err(ToolsError::RemoteCall {
                function: call.name.clone(),
                url,
                status: status.as_u16(),
                body: response_text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        if response_text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&response_text).map_err(|e| ToolsError::InvalidResponse {
            url,
            message: e.to_string(),
        })
    }
}

/// String form of an argument; `None` for null
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Arrays become repeated keys; nulls are dropped
fn push_query_values(query: &mut Vec<(String, String)>, name: &str, value: &Value) {
    match value {
        Value::Array(items) => {
            for item in items {
                if let Some(s) = scalar_to_string(item) {
                    query.push((name.to_string(), s));
                }
            }
        }
        other => {
            if let Some(s) = scalar_to_string(other) {
                query.push((name.to_string(), s));
            }
        }
    }
}

fn encode_path_segment(raw: &str) -> String {
    // byte_serialize emits '+' for spaces, which is literal in a path
    form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

fn unfilled_placeholder(path: &str) -> Option<&str> {
    let start = path.find('{')?;
    let len = path[start..].find('}')?;
    Some(&path[start + 1..start + len])
}
