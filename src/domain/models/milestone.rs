//! Milestone domain model.

use serde::{Deserialize, Serialize};

use crate::domain::errors::{TaskManagerError, TaskManagerResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneState {
    Open,
    Closed,
}

impl MilestoneState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    /// Parse the remote's state name (`OPEN` / `CLOSED`, any case).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

/// A milestone, keyed by title within the scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub title: String,
    pub description: Option<String>,
    /// Due date as reported by the remote, kept verbatim.
    pub due_on: Option<String>,
    pub state: MilestoneState,
    pub url: Option<String>,
}

impl Milestone {
    pub fn validate(&self) -> TaskManagerResult<()> {
        if self.title.trim().is_empty() {
            return Err(TaskManagerError::malformed("milestone.title"));
        }
        Ok(())
    }
}
