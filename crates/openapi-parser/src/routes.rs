//! Route table for resolving function names back to endpoints

use crate::types::{ApiOperation, HttpMethod};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Lookup table from (method, operation ID) to route, built once per spec
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteTable {
    routes: HashMap<HttpMethod, HashMap<String, RouteRef>>,
}

/// Reference to an operation's endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRef {
    /// Operation ID
    pub operation_id: String,
    /// HTTP method
    pub method: HttpMethod,
    /// URL path template
    pub path: String,
    /// Index in the operations list
    pub index: usize,
}

impl RouteTable {
    /// Create a new empty route table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a route table from a list of operations
    ///
    /// When an operation ID repeats under the same method, the first
    /// occurrence in document order wins.
    pub fn build(operations: &[ApiOperation]) -> Self {
        let mut table = Self::new();

        for (index, op) in operations.iter().enumerate() {
            let inserted = table.insert(RouteRef {
                operation_id: op.operation_id.clone(),
                method: op.method,
                path: op.path.clone(),
                index,
            });
            if !inserted {
                warn!(
                    "Duplicate operationId {} for {} {} - keeping first definition",
                    op.operation_id, op.method, op.path
                );
            }
        }

        table
    }

    /// Insert a route; returns false if the name is already taken for that method
    pub fn insert(&mut self, route: RouteRef) -> bool {
        let by_name = self.routes.entry(route.method).or_default();
        if by_name.contains_key(&route.operation_id) {
            return false;
        }
        by_name.insert(route.operation_id.clone(), route);
        true
    }

    /// Look up a route by method and operation ID
    pub fn lookup(&self, method: HttpMethod, operation_id: &str) -> Option<&RouteRef> {
        self.routes
            .get(&method)
            .and_then(|by_name| by_name.get(operation_id))
    }

    /// Methods under which an operation ID is defined
    pub fn methods_for(&self, operation_id: &str) -> Vec<HttpMethod> {
        HttpMethod::ALL
            .into_iter()
            .filter(|method| self.lookup(*method, operation_id).is_some())
            .collect()
    }

    /// Total number of routes
    pub fn len(&self) -> usize {
        self.routes.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operation(operation_id: &str, method: HttpMethod, path: &str) -> ApiOperation {
        ApiOperation {
            operation_id: operation_id.to_string(),
            method,
            path: path.to_string(),
            summary: None,
            description: None,
            tags: vec![],
            deprecated: false,
            parameters: vec![],
            request_body: None,
        }
    }

    fn test_table() -> RouteTable {
        RouteTable::build(&[
            operation("listFilms", HttpMethod::Get, "/films"),
            operation("createFilm", HttpMethod::Post, "/films"),
            operation("getFilm", HttpMethod::Get, "/films/{filmId}"),
            operation("getFilm", HttpMethod::Get, "/movies/{filmId}"),
        ])
    }

    #[test]
    fn test_lookup() {
        let table = test_table();

        let route = table.lookup(HttpMethod::Get, "listFilms").unwrap();
        assert_eq!(route.path, "/films");
        assert_eq!(route.index, 0);
    }

    #[test]
    fn test_lookup_respects_method() {
        let table = test_table();

        assert!(table.lookup(HttpMethod::Get, "createFilm").is_none());
        assert_eq!(table.methods_for("createFilm"), vec![HttpMethod::Post]);
    }

    #[test]
    fn test_duplicate_keeps_first() {
        let table = test_table();

        let route = table.lookup(HttpMethod::Get, "getFilm").unwrap();
        assert_eq!(route.path, "/films/{filmId}");
        assert_eq!(table.len(), 3);
    }
}
