//! Function schema types handed to LLM tool-calling interfaces

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Tool type tag used by OpenAI-style tool definitions
pub const FUNCTION_TYPE: &str = "function";

/// A callable function derived from one API operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSchema {
    /// Always "function"
    #[serde(rename = "type")]
    pub tool_type: String,
    /// Function name (the operation ID)
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Parameter object schema
    pub parameters: FunctionParameters,
}

impl FunctionSchema {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: FunctionParameters,
    ) -> Self {
        Self {
            tool_type: FUNCTION_TYPE.to_string(),
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// Whether a parameter is in the required set
    pub fn is_required(&self, parameter: &str) -> bool {
        self.parameters.required.iter().any(|r| r == parameter)
    }

    /// Render in the Chat Completions shape: `{type, function: {name, description, parameters}}`
    pub fn to_chat_completions_tool(&self) -> Value {
        json!({
            "type": FUNCTION_TYPE,
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters,
            }
        })
    }
}

/// JSON Schema object describing a function's arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionParameters {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub properties: IndexMap<String, PropertySchema>,
    pub required: Vec<String>,
    /// Always false: no arguments beyond the declared set are accepted
    pub additional_properties: bool,
}

impl Default for FunctionParameters {
    fn default() -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: IndexMap::new(),
            required: Vec::new(),
            additional_properties: false,
        }
    }
}

impl FunctionParameters {
    /// Add a property, optionally marking it required
    pub fn insert(&mut self, name: impl Into<String>, property: PropertySchema, required: bool) {
        let name = name.into();
        if required && !self.required.contains(&name) {
            self.required.push(name.clone());
        }
        self.properties.insert(name, property);
    }
}

/// Schema for a single function argument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    pub description: String,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, PropertySchema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

impl PropertySchema {
    pub fn new(schema_type: SchemaType, description: impl Into<String>) -> Self {
        Self {
            schema_type,
            description: description.into(),
            enum_values: None,
            items: None,
            properties: None,
            required: None,
        }
    }
}

/// A JSON Schema `type`: one name, or a union such as `["integer", "null"]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    Single(String),
    Union(Vec<String>),
}

impl SchemaType {
    /// Read `type` from a schema, defaulting to string
    pub fn from_schema(schema: Option<&Value>) -> Self {
        match schema.and_then(|s| s.get("type")) {
            Some(Value::String(t)) => SchemaType::Single(t.clone()),
            Some(Value::Array(types)) => {
                let names: Vec<String> = types
                    .iter()
                    .filter_map(|t| t.as_str().map(str::to_string))
                    .collect();
                if names.is_empty() {
                    SchemaType::Single("string".to_string())
                } else {
                    SchemaType::Union(names)
                }
            }
            _ => SchemaType::Single("string".to_string()),
        }
    }

    /// Widen the type to also accept null
    pub fn nullable(self) -> Self {
        match self {
            SchemaType::Single(t) if t == "null" => SchemaType::Single(t),
            SchemaType::Single(t) => SchemaType::Union(vec![t, "null".to_string()]),
            SchemaType::Union(mut types) => {
                if !types.iter().any(|t| t == "null") {
                    types.push("null".to_string());
                }
                SchemaType::Union(types)
            }
        }
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            SchemaType::Single(t) => t == "null",
            SchemaType::Union(types) => types.iter().any(|t| t == "null"),
        }
    }
}
