//! Shared fixtures for unit tests

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use openapi_parser::{OpenApiParser, ParsedSpec};
use serde_json::{json, Value};
use std::collections::HashMap;

pub fn film_document() -> Value {
    json!({
        "openapi": "3.0.3",
        "info": {"title": "Films", "version": "1"},
        "paths": {
            "/films/{filmId}": {
                "get": {
                    "operationId": "getFilm",
                    "description": "Get a film by ID",
                    "parameters": [
                        {"name": "filmId", "in": "path", "required": true,
                         "schema": {"type": "integer"}},
                        {"name": "limit", "in": "query", "schema": {"type": "integer"}}
                    ]
                }
            },
            "/films": {
                "get": {
                    "operationId": "listFilms",
                    "parameters": [
                        {"name": "tag", "in": "query",
                         "schema": {"type": "array", "items": {"type": "string"}}},
                        {"name": "q", "in": "query", "schema": {"type": "string"}}
                    ]
                },
                "post": {
                    "operationId": "createFilm",
                    "requestBody": {
                        "content": {
                            "application/json": {
                                "schema": {"type": "object", "properties": {"title": {"type": "string"}}}
                            }
                        }
                    }
                }
            },
            "/items/{id}": {
                "get": {
                    "operationId": "getItem",
                    "parameters": [
                        {"name": "id", "in": "path", "required": true, "schema": {"type": "string"}},
                        {"name": "filter", "in": "query", "schema": {"type": "string"}}
                    ]
                }
            },
            "/explode": {"get": {"operationId": "explode"}},
            "/empty": {"get": {"operationId": "noContent"}},
            "/text": {"get": {"operationId": "plainText"}}
        }
    })
}

pub fn film_spec() -> ParsedSpec {
    OpenApiParser::parse_document(&film_document()).unwrap()
}

/// Serve the film API on an ephemeral port; `/items` is left unrouted
pub async fn serve_film_api() -> String {
    let app = Router::new()
        .route(
            "/films/:film_id",
            get(
                |Path(film_id): Path<u64>, Query(query): Query<HashMap<String, String>>| async move {
                    Json(json!({"id": film_id, "title": "Alien", "query": query}))
                },
            ),
        )
        .route("/explode", get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "kaboom") }))
        .route("/empty", get(|| async { StatusCode::NO_CONTENT }))
        .route("/text", get(|| async { "plain text" }));

    serve(app).await
}

pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}
