//! Operation extraction from OpenAPI specs

use crate::resolver::SchemaResolver;
use crate::types::*;
use tracing::debug;

/// Extracts operations from raw OpenAPI spec structures
pub struct OperationExtractor;

impl OperationExtractor {
    /// Extract all operations, in path order and then method order
    pub fn extract(spec: &RawOpenApiSpec) -> Vec<ApiOperation> {
        let mut operations = Vec::new();

        let empty_components = RawComponents::default();
        let components = spec.components.as_ref().unwrap_or(&empty_components);
        let resolver = SchemaResolver::new(components);

        for (path, path_item) in &spec.paths {
            let path_params: Vec<OperationParameter> = path_item
                .parameters
                .iter()
                .filter_map(|p| Self::convert_parameter(p, &resolver))
                .collect();

            for method in HttpMethod::ALL {
                if let Some(op) = path_item.operation(method) {
                    operations.push(Self::extract_operation(
                        path,
                        method,
                        op,
                        &path_params,
                        &resolver,
                    ));
                }
            }
        }

        operations
    }

    /// Extract a single operation
    fn extract_operation(
        path: &str,
        method: HttpMethod,
        operation: &RawOperation,
        path_params: &[OperationParameter],
        resolver: &SchemaResolver,
    ) -> ApiOperation {
        let operation_id = match operation.operation_id.as_deref() {
            Some(id) if !id.trim().is_empty() => id.to_string(),
            _ => {
                let generated = Self::generate_operation_id(path, method);
                debug!("No operationId for {} {}, using {}", method, path, generated);
                generated
            }
        };

        // Operation-level parameters override path-level ones with the same name and location
        let mut parameters = path_params.to_vec();
        for param in &operation.parameters {
            if let Some(p) = Self::convert_parameter(param, resolver) {
                parameters.retain(|existing| {
                    !(existing.name == p.name && existing.location == p.location)
                });
                parameters.push(p);
            }
        }

        let request_body = operation
            .request_body
            .as_ref()
            .and_then(|body| Self::extract_request_body(body, resolver));

        ApiOperation {
            operation_id,
            method,
            path: path.to_string(),
            summary: operation.summary.clone(),
            description: operation.description.clone(),
            tags: operation.tags.clone(),
            deprecated: operation.deprecated,
            parameters,
            request_body,
        }
    }

    /// Generate an operation ID from path and method
    fn generate_operation_id(path: &str, method: HttpMethod) -> String {
        // /users/{id}/posts -> users_id_posts
        let path_part = path
            .trim_start_matches('/')
            .replace('/', "_")
            .replace(['{', '}'], "");

        format!("{}_{}", method.as_str().to_lowercase(), path_part)
    }

    /// Convert a raw parameter, following `$ref`s into components
    fn convert_parameter(
        param: &RawParameter,
        resolver: &SchemaResolver,
    ) -> Option<OperationParameter> {
        let param = resolver.resolve_parameter(param)?;
        let location = param.location()?;
        if param.name.is_empty() {
            return None;
        }

        Some(OperationParameter {
            name: param.name.clone(),
            location,
            required: param.required,
            description: param.description.clone(),
            schema: param.schema.as_ref().map(|s| resolver.resolve(s)),
            deprecated: param.deprecated,
        })
    }

    /// Extract request body information, keeping every media type
    fn extract_request_body(
        body: &RawRequestBody,
        resolver: &SchemaResolver,
    ) -> Option<RequestBody> {
        let body = resolver.resolve_request_body(body)?;

        let content = body
            .content
            .iter()
            .map(|(media_type, media)| {
                (
                    media_type.clone(),
                    media.schema.as_ref().map(|s| resolver.resolve(s)),
                )
            })
            .collect();

        Some(RequestBody {
            required: body.required,
            description: body.description.clone(),
            content,
        })
    }
}
