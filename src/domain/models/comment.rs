//! Comment domain model.

use serde::{Deserialize, Serialize};

use crate::domain::errors::{TaskManagerError, TaskManagerResult};

/// A comment on a ticket. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Opaque comment identifier.
    pub id: String,
    /// Opaque identifier of the ticket the comment belongs to.
    pub ticket_id: String,
    pub body: String,
    /// Login of the author; `ghost` when the account no longer exists.
    pub author: String,
    /// ISO-8601 timestamp, kept verbatim.
    pub created_at: String,
    pub url: Option<String>,
}

/// Author login the remote reports for deleted accounts.
pub const GHOST_AUTHOR: &str = "ghost";

impl Comment {
    pub fn validate(&self) -> TaskManagerResult<()> {
        if self.id.trim().is_empty() {
            return Err(TaskManagerError::malformed("comment.id"));
        }
        if self.ticket_id.trim().is_empty() {
            return Err(TaskManagerError::malformed("comment.ticket_id"));
        }
        Ok(())
    }
}
