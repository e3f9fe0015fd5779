//! Shared HTTP plumbing for both GitHub protocols.
//!
//! Holds the immutable connection settings and a pooled `reqwest` client.
//! Cloning is cheap; clones share the connection pool.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Url};

use crate::domain::errors::{TaskManagerError, TaskManagerResult};
use crate::domain::models::GitHubConfig;

/// Maximum number of body characters kept when echoing a body into a log line.
const MAX_LOGGED_BODY: usize = 500;

/// Authorized HTTP access to the GitHub APIs.
#[derive(Debug, Clone)]
pub struct GitHubHttp {
    /// The underlying HTTP client.
    client: Client,
    /// Connection settings, including the token.
    config: Arc<GitHubConfig>,
}

impl GitHubHttp {
    /// Build the HTTP client from validated settings.
    pub fn new(config: GitHubConfig) -> TaskManagerResult<Self> {
        if config.token.trim().is_empty() {
            return Err(TaskManagerError::Configuration(
                "GitHub token must not be empty".to_string(),
            ));
        }
        if config.owner.trim().is_empty() || config.repo.trim().is_empty() {
            return Err(TaskManagerError::Configuration(
                "GitHub owner and repo must both be set".to_string(),
            ));
        }
        if config.timeout_secs == 0 {
            return Err(TaskManagerError::Configuration(
                "GitHub timeout_secs must be at least 1".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| {
                TaskManagerError::Configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    /// Build an authorized request.
    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.config.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    /// Build a REST URL from path segments under the API base.
    ///
    /// Segments are percent-encoded individually, so label names containing
    /// spaces or slashes address the right resource.
    pub fn rest_url<I, S>(&self, segments: I) -> TaskManagerResult<Url>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut url = Url::parse(self.config.rest_base()).map_err(|e| {
            TaskManagerError::Configuration(format!("invalid GitHub api_url: {e}"))
        })?;
        url.path_segments_mut()
            .map_err(|()| {
                TaskManagerError::Configuration(
                    "GitHub api_url cannot be used as a base URL".to_string(),
                )
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub fn graphql_url(&self) -> TaskManagerResult<Url> {
        Url::parse(&self.config.graphql_endpoint()).map_err(|e| {
            TaskManagerError::Configuration(format!("invalid GitHub graphql_url: {e}"))
        })
    }
}

/// Translate a `reqwest` failure into a transport error.
///
/// The message never includes request headers, so the token cannot leak.
pub fn transport_error(operation: &str, err: &reqwest::Error) -> TaskManagerError {
    let kind = if err.is_timeout() {
        "timed out"
    } else if err.is_connect() {
        "connection failed"
    } else if err.is_body() || err.is_decode() {
        "response body could not be read"
    } else {
        "request failed"
    };
    TaskManagerError::transport(format!("{operation} {kind}: {err}"))
}

/// Shorten a body for log output.
pub fn truncate_for_log(body: &str) -> String {
    if body.chars().count() <= MAX_LOGGED_BODY {
        body.to_string()
    } else {
        format!("{}...", body.chars().take(MAX_LOGGED_BODY).collect::<String>())
    }
}
