//! GitHub wire models and their mapping into domain entities.
//!
//! GraphQL nodes are read through [`Node`] so a missing field is reported by
//! its full path. REST payloads are typed structs matching the REST API v3
//! JSON; they are not part of the public domain model.

use serde::{Deserialize, Serialize};

use crate::domain::errors::{TaskManagerError, TaskManagerResult};
use crate::domain::models::comment::GHOST_AUTHOR;
use crate::domain::models::{
    Comment, Label, Milestone, MilestoneState, ResolvedTicket, Ticket, TicketStatus,
};

use super::response::Node;

// ---------------------------------------------------------------------------
// GraphQL node mapping
// ---------------------------------------------------------------------------

fn ticket_status(node: &Node<'_>) -> TaskManagerResult<TicketStatus> {
    let state = node.str("state")?;
    TicketStatus::from_str(state)
        .ok_or_else(|| TaskManagerError::malformed(format!("{}.state", node.path())))
}

/// Whether an issue node belongs to `full_name` (`owner/repo`).
///
/// Opaque ids are global, so a node lookup can land in another repository.
pub fn in_scope(node: &Node<'_>, full_name: &str) -> TaskManagerResult<bool> {
    let repository = node.get("repository")?;
    Ok(repository
        .str("nameWithOwner")?
        .eq_ignore_ascii_case(full_name))
}

/// Map a `TicketFields` node.
pub fn ticket_from_node(node: &Node<'_>) -> TaskManagerResult<Ticket> {
    let assignee = node
        .nodes("assignees")?
        .first()
        .map(|a| a.str("login").map(str::to_string))
        .transpose()?;
    let labels = node
        .nodes("labels")?
        .iter()
        .map(|l| l.str("name").map(str::to_string))
        .collect::<TaskManagerResult<Vec<_>>>()?;
    let milestone = match node.get_opt("milestone") {
        Some(m) => Some(m.str("title")?.to_string()),
        None => None,
    };

    let ticket = Ticket {
        id: node.str("id")?.to_string(),
        number: node.u64("number")?,
        title: node.str("title")?.to_string(),
        body: node
            .opt_str("body")?
            .filter(|b| !b.is_empty())
            .map(str::to_string),
        status: ticket_status(node)?,
        assignee,
        labels,
        milestone,
        created_at: node.str("createdAt")?.to_string(),
        updated_at: node.str("updatedAt")?.to_string(),
        url: node.opt_str("url")?.map(str::to_string),
    };
    ticket.validate()?;
    Ok(ticket)
}

/// Map a `ResolvedFields` node.
pub fn resolved_from_node(node: &Node<'_>) -> TaskManagerResult<ResolvedTicket> {
    Ok(ResolvedTicket {
        id: node.str("id")?.to_string(),
        number: node.u64("number")?,
        database_id: node.u64("databaseId")?,
    })
}

pub fn comment_from_node(node: &Node<'_>, ticket_id: &str) -> TaskManagerResult<Comment> {
    let author = match node.get_opt("author") {
        Some(a) => a.str("login")?.to_string(),
        None => GHOST_AUTHOR.to_string(),
    };
    let comment = Comment {
        id: node.str("id")?.to_string(),
        ticket_id: ticket_id.to_string(),
        body: node.str("body")?.to_string(),
        author,
        created_at: node.str("createdAt")?.to_string(),
        url: node.opt_str("url")?.map(str::to_string),
    };
    comment.validate()?;
    Ok(comment)
}

pub fn label_from_node(node: &Node<'_>) -> TaskManagerResult<Label> {
    let label = Label {
        name: node.str("name")?.to_string(),
        color: node.str("color")?.to_string(),
        description: node
            .opt_str("description")?
            .filter(|d| !d.is_empty())
            .map(str::to_string),
    };
    label.validate()?;
    Ok(label)
}

pub fn milestone_from_node(node: &Node<'_>) -> TaskManagerResult<Milestone> {
    let state = node.str("state")?;
    let milestone = Milestone {
        title: node.str("title")?.to_string(),
        description: node
            .opt_str("description")?
            .filter(|d| !d.is_empty())
            .map(str::to_string),
        due_on: node.opt_str("dueOn")?.map(str::to_string),
        state: MilestoneState::from_str(state)
            .ok_or_else(|| TaskManagerError::malformed(format!("{}.state", node.path())))?,
        url: node.opt_str("url")?.map(str::to_string),
    };
    milestone.validate()?;
    Ok(milestone)
}

// ---------------------------------------------------------------------------
// REST payloads
// ---------------------------------------------------------------------------

/// A user reference in REST payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestUser {
    pub login: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestLabel {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestMilestone {
    pub title: String,
}

/// An issue returned by the REST write endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestIssue {
    /// Numeric database id.
    pub id: u64,
    /// Opaque GraphQL node id.
    pub node_id: String,
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    /// "open" or "closed".
    pub state: String,
    #[serde(default)]
    pub assignees: Vec<RestUser>,
    #[serde(default)]
    pub labels: Vec<RestLabel>,
    #[serde(default)]
    pub milestone: Option<RestMilestone>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub html_url: Option<String>,
}

impl RestIssue {
    /// The assignee login matching `login`, in GitHub's casing.
    pub fn assignee(&self, login: &str) -> Option<&str> {
        self.assignees
            .iter()
            .find(|a| a.login.eq_ignore_ascii_case(login))
            .map(|a| a.login.as_str())
    }

    pub fn resolved(&self) -> ResolvedTicket {
        ResolvedTicket {
            id: self.node_id.clone(),
            number: self.number,
            database_id: self.id,
        }
    }

    pub fn into_ticket(self) -> TaskManagerResult<Ticket> {
        let status = TicketStatus::from_str(&self.state)
            .ok_or_else(|| TaskManagerError::malformed("issue.state"))?;
        let ticket = Ticket {
            id: self.node_id,
            number: self.number,
            title: self.title,
            body: self.body.filter(|b| !b.is_empty()),
            status,
            assignee: self.assignees.into_iter().next().map(|a| a.login),
            labels: self.labels.into_iter().map(|l| l.name).collect(),
            milestone: self.milestone.map(|m| m.title),
            created_at: self.created_at,
            updated_at: self.updated_at,
            url: self.html_url,
        };
        ticket.validate()?;
        Ok(ticket)
    }
}

/// A comment returned by the create-comment endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestComment {
    pub id: u64,
    pub node_id: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub user: Option<RestUser>,
    pub created_at: String,
    #[serde(default)]
    pub html_url: Option<String>,
}

impl RestComment {
    pub fn into_comment(self, ticket_id: &str) -> TaskManagerResult<Comment> {
        let comment = Comment {
            id: self.node_id,
            ticket_id: ticket_id.to_string(),
            body: self.body.unwrap_or_default(),
            author: self
                .user
                .map_or_else(|| GHOST_AUTHOR.to_string(), |u| u.login),
            created_at: self.created_at,
            url: self.html_url,
        };
        comment.validate()?;
        Ok(comment)
    }
}

/// Request body for creating an issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIssueRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub assignees: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRequest {
    pub body: String,
}

/// Partial update of an issue. Only set fields are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<u64>,
    /// Replaces the whole assignee list when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignees: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelsRequest {
    pub labels: Vec<String>,
}

/// Body for linking a sub-issue; takes the child's database id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubIssueRequest {
    pub sub_issue_id: u64,
}

/// Body for adding a blocked-by dependency; takes the blocker's database id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockedByRequest {
    pub issue_id: u64,
}
