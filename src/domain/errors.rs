//! Error taxonomy for task manager operations.
//!
//! Every failure a provider can produce is translated into exactly one
//! [`TaskManagerError`] variant, with the remote diagnostic payload attached.
//! Credentials never appear in any variant.

use std::fmt;

use thiserror::Error;

/// A single structured-query error entry, preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryErrorEntry {
    /// Dotted field path the error applies to (empty when the remote gave none).
    pub path: String,
    /// Human-readable message from the remote system.
    pub message: String,
}

impl QueryErrorEntry {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for QueryErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Render a list of query errors as `path: message; path: message`.
fn format_query_errors(errors: &[QueryErrorEntry]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Project ownership scopes, in the order they are probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectScope {
    Repository,
    User,
    Organization,
}

impl ProjectScope {
    /// Probe order for project lookups.
    pub const PROBE_ORDER: [Self; 3] = [Self::Repository, Self::User, Self::Organization];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Repository => "repository",
            Self::User => "user",
            Self::Organization => "organization",
        }
    }
}

impl fmt::Display for ProjectScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn format_scopes(scopes: &[ProjectScope]) -> String {
    scopes
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors produced by a [`TaskManager`](crate::domain::ports::TaskManager).
#[derive(Debug, Error)]
pub enum TaskManagerError {
    /// Caller input could not be interpreted as a ticket or project reference.
    #[error("Invalid reference '{reference}': {reason}")]
    InvalidReference { reference: String, reason: String },

    #[error("Ticket not found: {reference}")]
    TicketNotFound { reference: String },

    #[error("Project {number} not found (tried scopes: {})", format_scopes(.tried))]
    ProjectNotFound {
        number: u64,
        tried: Vec<ProjectScope>,
    },

    #[error("Label not found: {0}")]
    LabelNotFound(String),

    #[error("Milestone not found: {0}")]
    MilestoneNotFound(String),

    /// The structured-query endpoint returned a top-level error list.
    #[error("Remote query failed: {}", format_query_errors(.errors))]
    RemoteQueryError { errors: Vec<QueryErrorEntry> },

    /// The resource endpoint answered a write with a non-2xx status.
    #[error("Remote write failed with HTTP {status}: {body}")]
    RemoteWriteError { status: u16, body: String },

    /// The request never produced an HTTP response (DNS, connect, timeout, reset, cancel).
    #[error("Transport error: {message}")]
    TransportError { message: String },

    /// The remote system violated its response contract.
    #[error("Malformed response: missing or invalid field '{field}'")]
    MalformedResponse { field: String },

    /// A multi-step operation's earlier write took effect before a later step failed.
    #[error("Partially applied ({applied}): {source}")]
    PartiallyApplied {
        applied: String,
        #[source]
        source: Box<TaskManagerError>,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type TaskManagerResult<T> = Result<T, TaskManagerError>;

impl TaskManagerError {
    pub fn invalid_reference(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidReference {
            reference: reference.into(),
            reason: reason.into(),
        }
    }

    pub fn ticket_not_found(reference: impl Into<String>) -> Self {
        Self::TicketNotFound {
            reference: reference.into(),
        }
    }

    pub fn malformed(field: impl Into<String>) -> Self {
        Self::MalformedResponse {
            field: field.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::TransportError {
            message: message.into(),
        }
    }

    /// Whether a caller may retry the failed call.
    ///
    /// Transport errors are always retryable. Remote write errors are
    /// retryable only when the operation is idempotent at the remote system;
    /// 4xx responses other than 408 and 429 indicate a request the remote
    /// will keep rejecting and are never retried.
    pub fn is_retryable(&self, idempotent: bool) -> bool {
        match self {
            Self::TransportError { .. } => true,
            Self::RemoteWriteError { status, .. } => {
                idempotent && (*status >= 500 || *status == 408 || *status == 429)
            }
            _ => false,
        }
    }
}

impl From<serde_json::Error> for TaskManagerError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse {
            field: format!("<body: {err}>"),
        }
    }
}
