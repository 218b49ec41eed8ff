//! Convert OpenAPI operations into LLM function schemas

use indexmap::IndexMap;
use openapi_parser::{ApiOperation, OperationParameter, ParameterLocation, ParsedSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ConversionError;
use crate::schema::{FunctionParameters, FunctionSchema, PropertySchema, SchemaType};

/// Name of the synthetic property carrying a JSON request body
pub const REQUEST_BODY_PARAMETER: &str = "requestBody";

/// What to do with request bodies that offer no JSON media type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnsupportedBodyPolicy {
    /// Fail the conversion with `ConversionError::UnsupportedMediaType`
    #[default]
    Reject,
    /// Leave the body out of the function schema and log a warning
    Skip,
}

impl std::str::FromStr for UnsupportedBodyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reject" => Ok(UnsupportedBodyPolicy::Reject),
            "skip" => Ok(UnsupportedBodyPolicy::Skip),
            other => Err(format!("expected 'reject' or 'skip', got '{}'", other)),
        }
    }
}

/// Conversion switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConverterOptions {
    /// Require every query parameter and skip nullable widening
    pub strict: bool,
    /// Handling of non-JSON request bodies
    pub unsupported_body: UnsupportedBodyPolicy,
}

/// Converter from parsed OpenAPI operations to function schemas
pub struct FunctionConverter {
    options: ConverterOptions,
}

impl FunctionConverter {
    /// Create a new converter
    pub fn new(options: ConverterOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ConverterOptions {
        self.options
    }

    /// Convert every operation, preserving path order and method order
    pub fn convert(&self, spec: &ParsedSpec) -> Result<Vec<FunctionSchema>, ConversionError> {
        spec.operations
            .iter()
            .map(|op| self.convert_operation(op))
            .collect()
    }

    /// Convert a single operation
    pub fn convert_operation(
        &self,
        operation: &ApiOperation,
    ) -> Result<FunctionSchema, ConversionError> {
        let mut parameters = FunctionParameters::default();

        // Path parameters are always required
        for param in operation.parameters_in(ParameterLocation::Path) {
            parameters.insert(param.name.clone(), self.build_property(param, false), true);
        }

        for param in operation.parameters_in(ParameterLocation::Query) {
            let required = self.options.strict || param.required;
            let widen = !self.options.strict && !param.required;
            parameters.insert(param.name.clone(), self.build_property(param, widen), required);
        }

        if let Some(body) = self.build_request_body(operation)? {
            parameters.insert(REQUEST_BODY_PARAMETER, body, true);
        }

        debug!(
            "Converted {} {} -> {} ({} params, {} required)",
            operation.method,
            operation.path,
            operation.operation_id,
            parameters.properties.len(),
            parameters.required.len()
        );

        Ok(FunctionSchema::new(
            operation.operation_id.clone(),
            Self::build_description(operation),
            parameters,
        ))
    }

    /// Operation description, falling back to the summary
    fn build_description(operation: &ApiOperation) -> String {
        operation
            .description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .or(operation.summary.as_deref())
            .unwrap_or_default()
            .to_string()
    }

    fn build_property(&self, param: &OperationParameter, nullable: bool) -> PropertySchema {
        let schema = param.schema.as_ref();

        let mut schema_type = SchemaType::from_schema(schema);
        if nullable {
            schema_type = schema_type.nullable();
        }

        let description = param.description.as_deref().unwrap_or_default();
        let mut property = PropertySchema::new(
            schema_type,
            Self::describe_default(description, schema.and_then(|s| s.get("default"))),
        );
        property.enum_values = Self::enum_values(schema);
        property
    }

    /// Fold a declared default into the description text
    fn describe_default(description: &str, default: Option<&Value>) -> String {
        let Some(default) = default else {
            return description.to_string();
        };

        let rendered = match default {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        if description.is_empty() {
            format!("Default value: {}", rendered)
        } else {
            format!("{} (default: {})", description, rendered)
        }
    }

    fn enum_values(schema: Option<&Value>) -> Option<Vec<Value>> {
        schema
            .and_then(|s| s.get("enum"))
            .and_then(Value::as_array)
            .cloned()
    }

    /// Flatten a JSON request body into one object-typed property
    fn build_request_body(
        &self,
        operation: &ApiOperation,
    ) -> Result<Option<PropertySchema>, ConversionError> {
        let Some(body) = operation.request_body.as_ref() else {
            return Ok(None);
        };
        if !operation.method.accepts_body() {
            return Ok(None);
        }
        if body.content.is_empty() {
            debug!("{} declares a request body with no content", operation.operation_id);
            return Ok(None);
        }

        let Some((_, schema)) = body.json_content() else {
            let media_types = body.media_types();
            return match self.options.unsupported_body {
                UnsupportedBodyPolicy::Reject => Err(ConversionError::UnsupportedMediaType {
                    operation_id: operation.operation_id.clone(),
                    media_types,
                }),
                UnsupportedBodyPolicy::Skip => {
                    warn!(
                        "Skipping request body of {}: no JSON media type (offered: {})",
                        operation.operation_id,
                        media_types.join(", ")
                    );
                    Ok(None)
                }
            };
        };

        let declared_required: Vec<&str> = schema
            .and_then(|s| s.get("required"))
            .and_then(Value::as_array)
            .map(|r| r.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let mut properties = IndexMap::new();
        let mut required = Vec::new();
        if let Some(props) = schema
            .and_then(|s| s.get("properties"))
            .and_then(Value::as_object)
        {
            for (name, prop_schema) in props {
                properties.insert(name.clone(), Self::build_body_property(prop_schema));
                if declared_required.contains(&name.as_str()) {
                    required.push(name.clone());
                }
            }
        }

        let description = body
            .description
            .clone()
            .unwrap_or_else(|| "Request body".to_string());

        let mut property = PropertySchema::new(SchemaType::Single("object".to_string()), description);
        property.properties = Some(properties);
        property.required = Some(required);
        Ok(Some(property))
    }

    fn build_body_property(schema: &Value) -> PropertySchema {
        let schema_type = SchemaType::from_schema(Some(schema));
        let description = schema
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default();

        let is_array = match &schema_type {
            SchemaType::Single(t) => t == "array",
            SchemaType::Union(types) => types.iter().any(|t| t == "array"),
        };

        let mut property = PropertySchema::new(schema_type, description);
        property.enum_values = Self::enum_values(Some(schema));
        if is_array {
            property.items = schema.get("items").cloned();
        }
        property
    }
}

impl Default for FunctionConverter {
    fn default() -> Self {
        Self::new(ConverterOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openapi_parser::OpenApiParser;
    use serde_json::json;

    fn film_spec() -> ParsedSpec {
        OpenApiParser::parse_document(&json!({
            "openapi": "3.0.3",
            "info": {"title": "Films", "version": "1"},
            "paths": {
                "/films/{filmId}": {
                    "get": {
                        "operationId": "getFilm",
                        "summary": "Fetch film",
                        "description": "Get a film by ID",
                        "parameters": [
                            {"name": "filmId", "in": "path", "required": false,
                             "description": "Film ID", "schema": {"type": "integer"}},
                            {"name": "limit", "in": "query",
                             "schema": {"type": "integer", "default": 10}},
                            {"name": "sort", "in": "query", "required": true,
                             "description": "Sort order",
                             "schema": {"type": "string", "enum": ["asc", "desc"]}},
                            {"name": "X-Trace", "in": "header", "schema": {"type": "string"}}
                        ]
                    },
                    "delete": {"operationId": "deleteFilm"}
                },
                "/films": {
                    "post": {
                        "operationId": "createFilm",
                        "requestBody": {
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "object",
                                        "required": ["title", "ghost"],
                                        "properties": {
                                            "title": {"type": "string", "description": "Title"},
                                            "rating": {"type": "string", "enum": ["G", "R"]},
                                            "tags": {"type": "array", "items": {"type": "string"}}
                                        }
                                    }
                                }
                            }
                        }
                    },
                    "get": {
                        "operationId": "listFilms",
                        "requestBody": {
                            "content": {"application/json": {"schema": {"type": "object"}}}
                        }
                    }
                }
            }
        }))
        .unwrap()
    }

    fn lenient() -> FunctionConverter {
        FunctionConverter::default()
    }

    fn strict() -> FunctionConverter {
        FunctionConverter::new(ConverterOptions {
            strict: true,
            ..Default::default()
        })
    }

    fn find<'a>(functions: &'a [FunctionSchema], name: &str) -> &'a FunctionSchema {
        functions.iter().find(|f| f.name == name).unwrap()
    }

    #[test]
    fn test_one_function_per_operation_in_order() {
        let functions = lenient().convert(&film_spec()).unwrap();
        let names: Vec<&str> = functions.iter().map(|f| f.name.as_str()).collect();

        assert_eq!(names, ["getFilm", "deleteFilm", "listFilms", "createFilm"]);
        assert!(functions.iter().all(|f| !f.parameters.additional_properties));
    }

    #[test]
    fn test_path_parameters_always_required() {
        for converter in [lenient(), strict()] {
            let functions = converter.convert(&film_spec()).unwrap();
            let get_film = find(&functions, "getFilm");

            assert!(get_film.is_required("filmId"));
            assert_eq!(
                get_film.parameters.properties["filmId"].schema_type,
                SchemaType::Single("integer".to_string())
            );
        }
    }

    #[test]
    fn test_optional_query_parameter_lenient() {
        let functions = lenient().convert(&film_spec()).unwrap();
        let get_film = find(&functions, "getFilm");
        let limit = &get_film.parameters.properties["limit"];

        assert!(!get_film.is_required("limit"));
        assert!(limit.schema_type.is_nullable());
        assert_eq!(limit.description, "Default value: 10");
    }

    #[test]
    fn test_optional_query_parameter_strict() {
        let functions = strict().convert(&film_spec()).unwrap();
        let get_film = find(&functions, "getFilm");
        let limit = &get_film.parameters.properties["limit"];

        assert!(get_film.is_required("limit"));
        assert_eq!(limit.schema_type, SchemaType::Single("integer".to_string()));
    }

    #[test]
    fn test_required_query_parameter_keeps_enum() {
        let functions = lenient().convert(&film_spec()).unwrap();
        let get_film = find(&functions, "getFilm");
        let sort = &get_film.parameters.properties["sort"];

        assert!(get_film.is_required("sort"));
        assert!(!sort.schema_type.is_nullable());
        assert_eq!(sort.enum_values, Some(vec![json!("asc"), json!("desc")]));
    }

    #[test]
    fn test_headers_are_not_exposed() {
        let functions = lenient().convert(&film_spec()).unwrap();
        let get_film = find(&functions, "getFilm");

        assert!(!get_film.parameters.properties.contains_key("X-Trace"));
        assert_eq!(get_film.description, "Get a film by ID");
    }

    #[test]
    fn test_request_body_flattened() {
        let functions = lenient().convert(&film_spec()).unwrap();
        let create = find(&functions, "createFilm");
        let body = &create.parameters.properties[REQUEST_BODY_PARAMETER];

        assert!(create.is_required(REQUEST_BODY_PARAMETER));
        assert_eq!(body.schema_type, SchemaType::Single("object".to_string()));
        assert_eq!(body.description, "Request body");
        assert_eq!(body.required.as_deref(), Some(&["title".to_string()][..]));

        let props = body.properties.as_ref().unwrap();
        assert_eq!(props["title"].description, "Title");
        assert_eq!(props["rating"].enum_values.as_ref().unwrap().len(), 2);
        assert_eq!(props["tags"].items, Some(json!({"type": "string"})));
    }

    #[test]
    fn test_body_ignored_on_get() {
        let functions = lenient().convert(&film_spec()).unwrap();
        let list = find(&functions, "listFilms");

        assert!(list.parameters.properties.is_empty());
        assert!(list.parameters.required.is_empty());
    }

    fn form_body_spec() -> ParsedSpec {
        OpenApiParser::parse_document(&json!({
            "openapi": "3.0.3",
            "info": {"title": "Forms", "version": "1"},
            "paths": {
                "/upload": {
                    "post": {
                        "operationId": "upload",
                        "requestBody": {
                            "content": {
                                "multipart/form-data": {"schema": {"type": "object"}},
                                "application/x-www-form-urlencoded": {"schema": {"type": "object"}}
                            }
                        }
                    }
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_non_json_body_rejected_by_default() {
        let result = lenient().convert(&form_body_spec());

        match result {
            Err(ConversionError::UnsupportedMediaType { operation_id, media_types }) => {
                assert_eq!(operation_id, "upload");
                assert_eq!(
                    media_types,
                    ["multipart/form-data", "application/x-www-form-urlencoded"]
                );
            }
            other => panic!("Expected UnsupportedMediaType, got {:?}", other),
        }
    }

    #[test]
    fn test_non_json_body_skipped_when_configured() {
        let converter = FunctionConverter::new(ConverterOptions {
            strict: false,
            unsupported_body: UnsupportedBodyPolicy::Skip,
        });

        let functions = converter.convert(&form_body_spec()).unwrap();
        assert!(functions[0].parameters.properties.is_empty());
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("SKIP".parse::<UnsupportedBodyPolicy>(), Ok(UnsupportedBodyPolicy::Skip));
        assert!("maybe".parse::<UnsupportedBodyPolicy>().is_err());
    }
}
