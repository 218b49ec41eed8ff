//! `$ref` resolver for OpenAPI components

use serde_json::Value;
use tracing::debug;

use crate::types::{RawComponents, RawParameter, RawRequestBody};

const SCHEMA_PREFIX: &str = "#/components/schemas/";
const PARAMETER_PREFIX: &str = "#/components/parameters/";
const REQUEST_BODY_PREFIX: &str = "#/components/requestBodies/";

/// Resolves `$ref` references against a document's components
pub struct SchemaResolver<'a> {
    /// Components from the OpenAPI spec
    components: &'a RawComponents,
    /// Maximum recursion depth, bounds self-referencing schemas
    max_depth: usize,
}

impl<'a> SchemaResolver<'a> {
    /// Create a new resolver over the given components
    pub fn new(components: &'a RawComponents) -> Self {
        Self {
            components,
            max_depth: 10,
        }
    }

    /// Resolve a schema, following $ref references
    pub fn resolve(&self, schema: &Value) -> Value {
        self.resolve_with_depth(schema, 0)
    }

    /// Follow a parameter `$ref`; inline parameters are returned as-is
    pub fn resolve_parameter(&self, param: &'a RawParameter) -> Option<&'a RawParameter> {
        let mut current = param;
        for _ in 0..=self.max_depth {
            let Some(reference) = current.reference.as_deref() else {
                return Some(current);
            };
            let name = reference.strip_prefix(PARAMETER_PREFIX)?;
            current = match self.components.parameters.get(name) {
                Some(p) => p,
                None => {
                    debug!("Unresolvable parameter reference: {}", reference);
                    return None;
                }
            };
        }
        None
    }

    /// Follow a request body `$ref`; inline bodies are returned as-is
    pub fn resolve_request_body(&self, body: &'a RawRequestBody) -> Option<&'a RawRequestBody> {
        let mut current = body;
        for _ in 0..=self.max_depth {
            let Some(reference) = current.reference.as_deref() else {
                return Some(current);
            };
            let name = reference.strip_prefix(REQUEST_BODY_PREFIX)?;
            current = match self.components.request_bodies.get(name) {
                Some(b) => b,
                None => {
                    debug!("Unresolvable request body reference: {}", reference);
                    return None;
                }
            };
        }
        None
    }

    fn resolve_with_depth(&self, schema: &Value, depth: usize) -> Value {
        if depth > self.max_depth {
            return schema.clone();
        }

        match schema {
            Value::Object(obj) => {
                if let Some(resolved) = obj
                    .get("$ref")
                    .and_then(Value::as_str)
                    .and_then(|r| self.resolve_ref(r))
                {
                    return self.resolve_with_depth(resolved, depth + 1);
                }

                let mut result = serde_json::Map::new();
                for (key, value) in obj {
                    let resolved = match key.as_str() {
                        "properties" => self.resolve_properties(value, depth),
                        "items" => self.resolve_with_depth(value, depth + 1),
                        "additionalProperties" if value.is_object() => {
                            self.resolve_with_depth(value, depth + 1)
                        }
                        "allOf" | "oneOf" | "anyOf" => self.resolve_array(value, depth),
                        _ => value.clone(),
                    };
                    result.insert(key.clone(), resolved);
                }
                Value::Object(result)
            }
            _ => schema.clone(),
        }
    }

    fn resolve_ref(&self, ref_str: &str) -> Option<&'a Value> {
        let name = ref_str.strip_prefix(SCHEMA_PREFIX)?;
        self.components.schemas.get(name)
    }

    fn resolve_properties(&self, value: &Value, depth: usize) -> Value {
        match value.as_object() {
            Some(obj) => Value::Object(
                obj.iter()
                    .map(|(key, prop)| (key.clone(), self.resolve_with_depth(prop, depth + 1)))
                    .collect(),
            ),
            None => value.clone(),
        }
    }

    fn resolve_array(&self, value: &Value, depth: usize) -> Value {
        match value.as_array() {
            Some(arr) => Value::Array(
                arr.iter()
                    .map(|item| self.resolve_with_depth(item, depth + 1))
                    .collect(),
            ),
            None => value.clone(),
        }
    }
}
