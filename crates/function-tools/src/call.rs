//! Function calls requested by an agent, and the outputs sent back

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, ToolsError};

/// A request to invoke one function with a flat argument mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Function name
    pub name: String,
    /// Arguments in the order the agent supplied them
    #[serde(default)]
    pub arguments: IndexMap<String, Value>,
    /// Correlation ID assigned by the agent framework
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, arguments: IndexMap<String, Value>) -> Self {
        Self {
            name: name.into(),
            arguments,
            call_id: None,
        }
    }

    pub fn with_call_id(mut self, call_id: impl Into<String>) -> Self {
        self.call_id = Some(call_id.into());
        self
    }

    /// Build a call from a name and the JSON-encoded arguments string LLMs emit
    pub fn from_json_arguments(name: impl Into<String>, arguments: &str) -> Result<Self> {
        let name = name.into();
        if arguments.trim().is_empty() {
            return Ok(Self::new(name, IndexMap::new()));
        }

        let value: Value =
            serde_json::from_str(arguments).map_err(|e| ToolsError::InvalidArguments {
                function: name.clone(),
                message: format!("arguments are not valid JSON: {}", e),
            })?;

        Self::from_value(name, value)
    }

    /// Build a call from an already-decoded argument value (must be an object or null)
    pub fn from_value(name: impl Into<String>, arguments: Value) -> Result<Self> {
        let name = name.into();
        match arguments {
            Value::Object(map) => Ok(Self::new(name, map.into_iter().collect())),
            Value::Null => Ok(Self::new(name, IndexMap::new())),
            other => Err(ToolsError::InvalidArguments {
                function: name,
                message: format!("arguments must be a JSON object, got {}", other),
            }),
        }
    }

    /// Parse a model output item
    ///
    /// Accepts a Responses API `function_call` item
    /// (`{type, name, arguments, call_id}`) or a Chat Completions tool call
    /// (`{id, type, function: {name, arguments}}`). `arguments` may be a
    /// JSON-encoded string or an object.
    pub fn from_output_item(item: &Value) -> Result<Self> {
        let (function, call_id) = match item.get("function") {
            Some(function) => (function, item.get("id")),
            None => (item, item.get("call_id")),
        };

        let name = function
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolsError::InvalidArguments {
                function: "<unnamed>".to_string(),
                message: "output item has no function name".to_string(),
            })?;

        let mut call = match function.get("arguments") {
            Some(Value::String(encoded)) => Self::from_json_arguments(name, encoded)?,
            Some(value) => Self::from_value(name, value.clone())?,
            None => Self::new(name, IndexMap::new()),
        };

        if let Some(id) = call_id.and_then(Value::as_str) {
            call.call_id = Some(id.to_string());
        }

        Ok(call)
    }
}

/// The `function_call_output` item an agent loop sends back to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCallOutput {
    #[serde(rename = "type")]
    pub item_type: String,
    pub call_id: String,
    pub output: String,
}

impl FunctionCallOutput {
    pub fn new(call_id: impl Into<String>, result: &Value) -> Self {
        Self {
            item_type: "function_call_output".to_string(),
            call_id: call_id.into(),
            output: result.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_arguments_keeps_order() {
        let call = FunctionCall::from_json_arguments("getFilm", r#"{"filmId": 7, "limit": 5}"#)
            .unwrap();

        let keys: Vec<&str> = call.arguments.keys().map(String::as_str).collect();
        assert_eq!(keys, ["filmId", "limit"]);
        assert_eq!(call.arguments["filmId"], 7);
    }

    #[test]
    fn test_from_json_arguments_rejects_non_object() {
        let result = FunctionCall::from_json_arguments("getFilm", "[1, 2]");
        assert!(matches!(result, Err(ToolsError::InvalidArguments { .. })));

        let result = FunctionCall::from_json_arguments("getFilm", "{oops");
        assert!(matches!(result, Err(ToolsError::InvalidArguments { .. })));
    }

    #[test]
    fn test_empty_arguments() {
        let call = FunctionCall::from_json_arguments("listFilms", "  ").unwrap();
        assert!(call.arguments.is_empty());
    }

    #[test]
    fn test_from_responses_item() {
        let item = json!({
            "type": "function_call",
            "name": "getFilm",
            "arguments": "{\"filmId\": 7}",
            "call_id": "call_123"
        });

        let call = FunctionCall::from_output_item(&item).unwrap();
        assert_eq!(call.name, "getFilm");
        assert_eq!(call.call_id.as_deref(), Some("call_123"));
        assert_eq!(call.arguments["filmId"], 7);
    }

    #[test]
    fn test_from_chat_completions_tool_call() {
        let item = json!({
            "id": "call_abc",
            "type": "function",
            "function": {"name": "listFilms", "arguments": {"limit": 3}}
        });

        let call = FunctionCall::from_output_item(&item).unwrap();
        assert_eq!(call.name, "listFilms");
        assert_eq!(call.call_id.as_deref(), Some("call_abc"));
        assert_eq!(call.arguments["limit"], 3);
    }

    #[test]
    fn test_function_call_output() {
        let output = FunctionCallOutput::new("call_123", &json!({"title": "Alien"}));
        let value = serde_json::to_value(&output).unwrap();

        assert_eq!(value["type"], "function_call_output");
        assert_eq!(value["call_id"], "call_123");
        assert_eq!(value["output"], r#"{"title":"Alien"}"#);
    }
}
