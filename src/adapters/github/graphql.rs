//! GraphQL query executor.
//!
//! Sends a document and variables to the GitHub GraphQL endpoint and applies
//! all-or-nothing semantics: a response carrying a top-level `errors` list
//! never yields data, even when partial data came back alongside it.

use std::time::Instant;

use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::domain::errors::{QueryErrorEntry, TaskManagerError, TaskManagerResult};

use super::transport::{transport_error, truncate_for_log, GitHubHttp};

/// Error `type` GitHub reports when a looked-up object does not exist.
const NOT_FOUND: &str = "NOT_FOUND";

/// A GraphQL request.
#[derive(Debug, Clone)]
pub struct GraphqlRequest {
    /// Operation name, used for logging.
    pub operation: &'static str,
    pub query: String,
    pub variables: Value,
}

impl GraphqlRequest {
    pub fn new(operation: &'static str, query: impl Into<String>, variables: Value) -> Self {
        Self {
            operation,
            query: query.into(),
            variables,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GraphqlResponseEnvelope {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphqlErrorWire>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorWire {
    message: String,
    #[serde(default)]
    path: Vec<Value>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

impl GraphqlErrorWire {
    fn is_not_found(&self) -> bool {
        self.kind.as_deref() == Some(NOT_FOUND)
    }

    fn into_entry(self) -> QueryErrorEntry {
        let path = self
            .path
            .iter()
            .map(|segment| match segment {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".");
        QueryErrorEntry::new(path, self.message)
    }
}

/// How `NOT_FOUND` errors in a response are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Any error fails the query.
    Strict,
    /// `NOT_FOUND` errors leave their field null; any other error fails.
    Lookup,
}

/// Executes GraphQL documents against GitHub.
#[derive(Debug, Clone)]
pub struct QueryExecutor {
    http: GitHubHttp,
}

impl QueryExecutor {
    pub const fn new(http: GitHubHttp) -> Self {
        Self { http }
    }

    /// Execute a query and return its `data` payload.
    ///
    /// Fails with [`TaskManagerError::RemoteQueryError`] if the response
    /// contains any top-level error.
    pub async fn execute(&self, request: &GraphqlRequest) -> TaskManagerResult<Value> {
        self.run(request, Mode::Strict).await
    }

    /// Execute a lookup query.
    ///
    /// GitHub answers a lookup of a missing object with a `NOT_FOUND` error
    /// and a null field. Those errors are dropped so callers can read the
    /// null as "does not exist"; every other error still fails the query.
    pub async fn execute_lookup(&self, request: &GraphqlRequest) -> TaskManagerResult<Value> {
        self.run(request, Mode::Lookup).await
    }

    async fn run(&self, request: &GraphqlRequest, mode: Mode) -> TaskManagerResult<Value> {
        let operation = request.operation;
        let url = self.http.graphql_url()?;
        debug!(operation, "executing GraphQL query");
        let started = Instant::now();

        let response = self
            .http
            .request(Method::POST, url)
            .json(&json!({
                "query": request.query,
                "variables": request.variables,
            }))
            .send()
            .await
            .map_err(|e| transport_error(operation, &e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(operation, &e))?;

        debug!(
            operation,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "GraphQL response received"
        );

        if !status.is_success() {
            warn!(
                operation,
                status = status.as_u16(),
                body = %truncate_for_log(&body),
                "GraphQL endpoint returned non-success status"
            );
            return Err(TaskManagerError::RemoteQueryError {
                errors: vec![QueryErrorEntry::new(
                    "",
                    format!("HTTP {}: {}", status.as_u16(), http_error_message(&body)),
                )],
            });
        }

        let envelope: GraphqlResponseEnvelope = serde_json::from_str(&body)?;
        interpret(envelope, mode, operation)
    }
}

/// Apply all-or-nothing semantics to a decoded envelope.
fn interpret(
    envelope: GraphqlResponseEnvelope,
    mode: Mode,
    operation: &str,
) -> TaskManagerResult<Value> {
    let errors: Vec<GraphqlErrorWire> = envelope
        .errors
        .unwrap_or_default()
        .into_iter()
        .filter(|e| !(mode == Mode::Lookup && e.is_not_found()))
        .collect();

    if !errors.is_empty() {
        let errors: Vec<QueryErrorEntry> =
            errors.into_iter().map(GraphqlErrorWire::into_entry).collect();
        warn!(operation, error_count = errors.len(), "GraphQL query returned errors");
        return Err(TaskManagerError::RemoteQueryError { errors });
    }

    envelope
        .data
        .filter(|d| !d.is_null())
        .ok_or_else(|| TaskManagerError::malformed("data"))
}

/// Pull the `message` out of a GitHub JSON error body, falling back to the
/// (truncated) raw body.
fn http_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| truncate_for_log(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(value: Value) -> GraphqlResponseEnvelope {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_errors_discard_partial_data() {
        let env = envelope(json!({
            "data": { "repository": { "issue": { "id": "I_1" } } },
            "errors": [ { "message": "Something broke", "path": ["repository", "issue"] } ]
        }));
        let err = interpret(env, Mode::Strict, "Test").unwrap_err();
        match err {
            TaskManagerError::RemoteQueryError { errors } => {
                assert_eq!(
                    errors,
                    vec![QueryErrorEntry::new("repository.issue", "Something broke")]
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_lookup_tolerates_not_found() {
        let env = envelope(json!({
            "data": { "repository": { "issue": null } },
            "errors": [ {
                "type": "NOT_FOUND",
                "message": "Could not resolve to an Issue with the number of 42.",
                "path": ["repository", "issue"]
            } ]
        }));
        let data = interpret(env, Mode::Lookup, "Test").unwrap();
        assert!(data["repository"]["issue"].is_null());
    }

    #[test]
    fn test_strict_rejects_not_found() {
        let env = envelope(json!({
            "data": { "repository": { "issue": null } },
            "errors": [ { "type": "NOT_FOUND", "message": "nope", "path": ["repository", "issue"] } ]
        }));
        assert!(matches!(
            interpret(env, Mode::Strict, "Test"),
            Err(TaskManagerError::RemoteQueryError { .. })
        ));
    }

    #[test]
    fn test_lookup_still_fails_on_other_errors() {
        let env = envelope(json!({
            "data": { "repository": { "issue": null } },
            "errors": [
                { "type": "NOT_FOUND", "message": "nope", "path": ["repository", "issue"] },
                { "type": "FORBIDDEN", "message": "Resource not accessible by integration" }
            ]
        }));
        let err = interpret(env, Mode::Lookup, "Test").unwrap_err();
        match err {
            TaskManagerError::RemoteQueryError { errors } => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].path, "");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_data_is_malformed() {
        let env = envelope(json!({ "data": null }));
        assert!(matches!(
            interpret(env, Mode::Strict, "Test"),
            Err(TaskManagerError::MalformedResponse { field }) if field == "data"
        ));
    }

    #[test]
    fn test_empty_error_list_is_success() {
        let env = envelope(json!({ "data": { "viewer": { "login": "mona" } }, "errors": [] }));
        assert!(interpret(env, Mode::Strict, "Test").is_ok());
    }

    #[test]
    fn test_numeric_path_segments() {
        let entry = GraphqlErrorWire {
            message: "bad".to_string(),
            path: vec![json!("search"), json!("nodes"), json!(3)],
            kind: None,
        }
        .into_entry();
        assert_eq!(entry.path, "search.nodes.3");
    }

    #[test]
    fn test_http_error_message_extracts_message() {
        assert_eq!(
            http_error_message(r#"{"message":"Bad credentials","documentation_url":"x"}"#),
            "Bad credentials"
        );
        assert_eq!(http_error_message("<html>oops</html>"), "<html>oops</html>");
    }
}
