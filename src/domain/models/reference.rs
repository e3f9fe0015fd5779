//! Ticket references.
//!
//! Callers identify tickets either by their human-facing sequence number
//! (`"42"`) or by the remote system's opaque identifier (`"I_kwDOABC123"`).
//! Both forms are parsed once into a [`TicketRef`] and every downstream
//! component works from that value.

use std::fmt;

use crate::domain::errors::{TaskManagerError, TaskManagerResult};

/// A classified ticket reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TicketRef {
    /// Per-scope sequence number (issue number).
    Sequence(u64),
    /// Globally unique opaque identifier (node id).
    Opaque(String),
}

impl TicketRef {
    /// Classify a caller-supplied reference string.
    ///
    /// Surrounding whitespace is ignored. An all-digit string is a sequence
    /// reference; any other non-empty string is opaque. Empty input, `0`, and
    /// digit strings that overflow `u64` are rejected: no ticket can carry
    /// those numbers and the remote never issues all-digit opaque ids.
    pub fn parse(raw: &str) -> TaskManagerResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskManagerError::invalid_reference(
                raw,
                "reference must not be empty",
            ));
        }

        if trimmed.bytes().all(|b| b.is_ascii_digit()) {
            let number = trimmed.parse::<u64>().map_err(|_| {
                TaskManagerError::invalid_reference(raw, "sequence number is out of range")
            })?;
            if number == 0 {
                return Err(TaskManagerError::invalid_reference(
                    raw,
                    "sequence numbers start at 1",
                ));
            }
            return Ok(Self::Sequence(number));
        }

        if trimmed.chars().any(char::is_whitespace) {
            return Err(TaskManagerError::invalid_reference(
                raw,
                "opaque identifiers cannot contain whitespace",
            ));
        }

        Ok(Self::Opaque(trimmed.to_string()))
    }

    pub const fn is_sequence(&self) -> bool {
        matches!(self, Self::Sequence(_))
    }
}

impl fmt::Display for TicketRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequence(n) => write!(f, "#{n}"),
            Self::Opaque(id) => f.write_str(id),
        }
    }
}

/// Concrete addressing for a ticket that is known to exist.
///
/// Produced by resolution; carries every identifier either protocol needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTicket {
    /// Opaque identifier used by the structured-query endpoint.
    pub id: String,
    /// Sequence number used in resource endpoint paths.
    pub number: u64,
    /// Numeric database id used in link request bodies.
    pub database_id: u64,
}
