//! REST mutation executor.
//!
//! Each write is described by a [`Mutation`] value carrying its method,
//! path and JSON body. Non-2xx responses become
//! [`TaskManagerError::RemoteWriteError`] with the status and the body.

use std::time::Instant;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::errors::{TaskManagerError, TaskManagerResult};
use crate::domain::models::Scope;

use super::models::{
    BlockedByRequest, CommentRequest, CreateIssueRequest, IssueUpdateRequest, LabelsRequest,
    SubIssueRequest,
};
use super::transport::{transport_error, truncate_for_log, GitHubHttp};

/// A single REST write against the scoped repository.
#[derive(Debug, Clone)]
pub enum Mutation {
    CreateIssue(CreateIssueRequest),
    AddComment {
        number: u64,
        body: CommentRequest,
    },
    AddLabels {
        number: u64,
        body: LabelsRequest,
    },
    RemoveLabel {
        number: u64,
        name: String,
    },
    UpdateIssue {
        number: u64,
        body: IssueUpdateRequest,
    },
    AddSubIssue {
        parent_number: u64,
        body: SubIssueRequest,
    },
    AddBlockedBy {
        number: u64,
        body: BlockedByRequest,
    },
}

impl Mutation {
    /// Short name for logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CreateIssue(_) => "create_issue",
            Self::AddComment { .. } => "add_comment",
            Self::AddLabels { .. } => "add_labels",
            Self::RemoveLabel { .. } => "remove_label",
            Self::UpdateIssue { .. } => "update_issue",
            Self::AddSubIssue { .. } => "add_sub_issue",
            Self::AddBlockedBy { .. } => "add_blocked_by",
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Self::CreateIssue(_)
            | Self::AddComment { .. }
            | Self::AddLabels { .. }
            | Self::AddSubIssue { .. }
            | Self::AddBlockedBy { .. } => Method::POST,
            Self::RemoveLabel { .. } => Method::DELETE,
            Self::UpdateIssue { .. } => Method::PATCH,
        }
    }

    /// Path segments below `repos/{owner}/{repo}`.
    pub fn segments(&self) -> Vec<String> {
        let issue = |n: u64, rest: &[&str]| {
            let mut segments = vec!["issues".to_string(), n.to_string()];
            segments.extend(rest.iter().map(|s| (*s).to_string()));
            segments
        };
        match self {
            Self::CreateIssue(_) => vec!["issues".to_string()],
            Self::AddComment { number, .. } => issue(*number, &["comments"]),
            Self::AddLabels { number, .. } => issue(*number, &["labels"]),
            Self::RemoveLabel { number, name } => issue(*number, &["labels", name.as_str()]),
            Self::UpdateIssue { number, .. } => issue(*number, &[]),
            Self::AddSubIssue { parent_number, .. } => issue(*parent_number, &["sub_issues"]),
            Self::AddBlockedBy { number, .. } => issue(*number, &["dependencies", "blocked_by"]),
        }
    }

    pub fn body(&self) -> TaskManagerResult<Option<Value>> {
        let body = match self {
            Self::CreateIssue(body) => serde_json::to_value(body),
            Self::AddComment { body, .. } => serde_json::to_value(body),
            Self::AddLabels { body, .. } => serde_json::to_value(body),
            Self::UpdateIssue { body, .. } => serde_json::to_value(body),
            Self::AddSubIssue { body, .. } => serde_json::to_value(body),
            Self::AddBlockedBy { body, .. } => serde_json::to_value(body),
            Self::RemoveLabel { .. } => return Ok(None),
        };
        body.map(Some).map_err(|e| {
            TaskManagerError::invalid_reference(self.name(), format!("unencodable body: {e}"))
        })
    }
}

/// Executes [`Mutation`]s against the GitHub REST API.
#[derive(Debug, Clone)]
pub struct MutationExecutor {
    http: GitHubHttp,
    scope: Scope,
}

impl MutationExecutor {
    pub const fn new(http: GitHubHttp, scope: Scope) -> Self {
        Self { http, scope }
    }

    /// Send a mutation and return the raw response body (empty for 204).
    pub async fn send(&self, mutation: &Mutation) -> TaskManagerResult<String> {
        let operation = mutation.name();
        let mut segments = vec![
            "repos".to_string(),
            self.scope.owner.clone(),
            self.scope.repo.clone(),
        ];
        segments.extend(mutation.segments());
        let url = self.http.rest_url(&segments)?;
        let method = mutation.method();

        debug!(
            operation,
            method = %method,
            path = url.path(),
            "sending REST mutation"
        );
        let started = Instant::now();

        let mut request = self.http.request(method, url);
        if let Some(body) = mutation.body()? {
            request = request.json(&body);
        }

        let response = request
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
            "REST mutation completed"
        );

        if !status.is_success() {
            warn!(
                operation,
                status = status.as_u16(),
                body = %truncate_for_log(&body),
                "REST mutation rejected"
            );
            return Err(TaskManagerError::RemoteWriteError {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }

    /// Send a mutation and decode its JSON response.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        mutation: &Mutation,
    ) -> TaskManagerResult<T> {
        let body = self.send(mutation).await?;
        Ok(serde_json::from_str(&body)?)
    }
}
