//! Ticket domain model.
//!
//! A ticket is a unit of tracked work owned by the remote system. The
//! adapter only ever holds request-scoped copies.

use serde::{Deserialize, Serialize};

use crate::domain::errors::{TaskManagerError, TaskManagerResult};

/// Lifecycle status of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    Closed,
}

impl TicketStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    /// Parse a status name. Accepts the aliases callers commonly use for a
    /// finished ticket.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "open" | "opened" | "reopen" | "todo" => Some(Self::Open),
            "closed" | "close" | "done" | "completed" | "resolved" => Some(Self::Closed),
            _ => None,
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tracked ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Durable opaque identifier issued by the remote system.
    pub id: String,
    /// Human-facing sequence number, unique within the scope.
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub status: TicketStatus,
    /// Login of the (first) assignee.
    pub assignee: Option<String>,
    /// Label names in the order the remote system reports them.
    pub labels: Vec<String>,
    /// Title of the milestone the ticket belongs to, if any.
    pub milestone: Option<String>,
    /// ISO-8601 timestamp, kept verbatim.
    pub created_at: String,
    /// ISO-8601 timestamp, kept verbatim.
    pub updated_at: String,
    pub url: Option<String>,
}

impl Ticket {
    /// Validate the invariants every ticket must satisfy.
    ///
    /// Used by the mapping layer so a remote payload that violates them
    /// surfaces as [`TaskManagerError::MalformedResponse`].
    pub fn validate(&self) -> TaskManagerResult<()> {
        if self.id.trim().is_empty() {
            return Err(TaskManagerError::malformed("ticket.id"));
        }
        if self.number == 0 {
            return Err(TaskManagerError::malformed("ticket.number"));
        }
        if self.title.trim().is_empty() {
            return Err(TaskManagerError::malformed("ticket.title"));
        }
        Ok(())
    }
}

/// Parameters for creating a ticket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTicket {
    pub title: String,
    pub body: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    pub assignee: Option<String>,
}

impl NewTicket {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    pub fn validate(&self) -> TaskManagerResult<()> {
        if self.title.trim().is_empty() {
            return Err(TaskManagerError::invalid_reference(
                "title",
                "ticket title must not be empty",
            ));
        }
        if self.labels.iter().any(|l| l.trim().is_empty()) {
            return Err(TaskManagerError::invalid_reference(
                "labels",
                "label names must not be empty",
            ));
        }
        Ok(())
    }
}

/// Upper bound on the number of tickets a single list call may return.
pub const MAX_TICKET_LIMIT: u32 = 100;

/// Default page size when the caller gives no limit.
pub const DEFAULT_TICKET_LIMIT: u32 = 50;

/// Filters for listing tickets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketFilters {
    pub status: Option<TicketStatus>,
    pub assignee: Option<String>,
    pub label: Option<String>,
    pub milestone: Option<String>,
    pub limit: Option<u32>,
}

impl TicketFilters {
    /// The limit actually sent to the remote, clamped to `1..=MAX_TICKET_LIMIT`.
    pub fn effective_limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_TICKET_LIMIT)
            .clamp(1, MAX_TICKET_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_ticket() -> Ticket {
        Ticket {
            id: "I_kwDOABC123".to_string(),
            number: 42,
            title: "Fix login bug".to_string(),
            body: None,
            status: TicketStatus::Open,
            assignee: None,
            labels: vec!["bug".to_string()],
            milestone: None,
            created_at: "2024-01-14T08:00:00Z".to_string(),
            updated_at: "2024-01-15T10:30:00Z".to_string(),
            url: None,
        }
    }

    #[test]
    fn test_status_parsing_aliases() {
        assert_eq!(TicketStatus::from_str("open"), Some(TicketStatus::Open));
        assert_eq!(TicketStatus::from_str("CLOSED"), Some(TicketStatus::Closed));
        assert_eq!(TicketStatus::from_str("done"), Some(TicketStatus::Closed));
        assert_eq!(TicketStatus::from_str(" Todo "), Some(TicketStatus::Open));
        assert_eq!(TicketStatus::from_str("in progress"), None);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&TicketStatus::Closed).unwrap();
        assert_eq!(json, "\"closed\"");
    }

    #[test]
    fn test_ticket_validate_rejects_empty_title() {
        let mut ticket = sample_ticket();
        ticket.title = "   ".to_string();
        assert!(matches!(
            ticket.validate(),
            Err(TaskManagerError::MalformedResponse { field }) if field == "ticket.title"
        ));
    }

    #[test]
    fn test_ticket_validate_accepts_complete_ticket() {
        assert!(sample_ticket().validate().is_ok());
    }

    #[test]
    fn test_new_ticket_validation() {
        assert!(NewTicket::new("Title").validate().is_ok());
        assert!(NewTicket::new("").validate().is_err());
        assert!(NewTicket::new("Title").with_label(" ").validate().is_err());
    }

    #[test]
    fn test_effective_limit_clamped() {
        let mut filters = TicketFilters::default();
        assert_eq!(filters.effective_limit(), DEFAULT_TICKET_LIMIT);
        filters.limit = Some(0);
        assert_eq!(filters.effective_limit(), 1);
        filters.limit = Some(500);
        assert_eq!(filters.effective_limit(), MAX_TICKET_LIMIT);
        filters.limit = Some(10);
        assert_eq!(filters.effective_limit(), 10);
    }
}
