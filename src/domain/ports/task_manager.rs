//! Task manager port.
//!
//! Defines the capability set a ticketing backend must provide. Ticket
//! references are passed as the caller supplied them (sequence number or
//! opaque id); implementations classify and resolve them centrally.

use async_trait::async_trait;

use crate::domain::errors::TaskManagerResult;
use crate::domain::models::{
    Comment, Label, Milestone, NewTicket, Ticket, TicketFilters, TicketStatus,
};

/// Every operation the port exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListTickets,
    GetTicket,
    ListComments,
    AddComment,
    ListLabels,
    ListTicketLabels,
    AddLabel,
    RemoveLabel,
    UpdateStatus,
    AddBranch,
    AddPullRequest,
    AddSubtask,
    AddParent,
    AddBlockedBy,
    AddBlocking,
    Assign,
    AssignToSelf,
    ListMilestones,
    AddToMilestone,
    CreateTicket,
    CreateSubtask,
    AddToProject,
}

impl Operation {
    /// Whether repeating the call leaves the remote in the same state and
    /// succeeds again.
    ///
    /// Creates and comments duplicate on repeat. Sub-issue and dependency
    /// links are rejected with 422 once they exist, and branch and pull
    /// request links are recorded as comments.
    pub const fn is_idempotent(self) -> bool {
        match self {
            Self::ListTickets
            | Self::GetTicket
            | Self::ListComments
            | Self::ListLabels
            | Self::ListTicketLabels
            | Self::ListMilestones
            | Self::AddLabel
            | Self::RemoveLabel
            | Self::UpdateStatus
            | Self::Assign
            | Self::AssignToSelf
            | Self::AddToMilestone
            | Self::AddToProject => true,
            Self::AddComment
            | Self::AddBranch
            | Self::AddPullRequest
            | Self::AddSubtask
            | Self::AddParent
            | Self::AddBlockedBy
            | Self::AddBlocking
            | Self::CreateTicket
            | Self::CreateSubtask => false,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ListTickets => "list_tickets",
            Self::GetTicket => "get_ticket",
            Self::ListComments => "list_comments",
            Self::AddComment => "add_comment",
            Self::ListLabels => "list_labels",
            Self::ListTicketLabels => "list_ticket_labels",
            Self::AddLabel => "add_label",
            Self::RemoveLabel => "remove_label",
            Self::UpdateStatus => "update_status",
            Self::AddBranch => "add_branch",
            Self::AddPullRequest => "add_pull_request",
            Self::AddSubtask => "add_subtask",
            Self::AddParent => "add_parent",
            Self::AddBlockedBy => "add_blocked_by",
            Self::AddBlocking => "add_blocking",
            Self::Assign => "assign",
            Self::AssignToSelf => "assign_to_self",
            Self::ListMilestones => "list_milestones",
            Self::AddToMilestone => "add_to_milestone",
            Self::CreateTicket => "create_ticket",
            Self::CreateSubtask => "create_subtask",
            Self::AddToProject => "add_to_project",
        }
    }
}

/// Port for ticketing backends.
///
/// Every method is a single self-contained call: implementations hold no
/// cross-call mutable state, so one instance may serve concurrent calls.
#[async_trait]
pub trait TaskManager: Send + Sync {
    /// Short backend name used in logs (e.g. `"github"`).
    fn provider_name(&self) -> &'static str;

    /// List tickets matching `filters`, in the remote system's default order.
    async fn list_tickets(&self, filters: &TicketFilters) -> TaskManagerResult<Vec<Ticket>>;

    async fn get_ticket(&self, reference: &str) -> TaskManagerResult<Ticket>;

    async fn list_comments(&self, reference: &str) -> TaskManagerResult<Vec<Comment>>;

    async fn add_comment(&self, reference: &str, body: &str) -> TaskManagerResult<Comment>;

    /// All labels defined in the scope.
    async fn list_labels(&self) -> TaskManagerResult<Vec<Label>>;

    /// Labels attached to one ticket.
    async fn list_ticket_labels(&self, reference: &str) -> TaskManagerResult<Vec<Label>>;

    /// Attach an existing label by name. Idempotent.
    async fn add_label(&self, reference: &str, label: &str) -> TaskManagerResult<()>;

    /// Idempotent: setting the current status again is not an error.
    async fn update_status(
        &self,
        reference: &str,
        status: TicketStatus,
    ) -> TaskManagerResult<Ticket>;

    async fn add_branch(&self, reference: &str, branch: &str) -> TaskManagerResult<()>;

    async fn add_pull_request(
        &self,
        reference: &str,
        pull_request: &str,
    ) -> TaskManagerResult<()>;

    /// Link `child` as a subtask of `parent`.
    async fn add_subtask(&self, parent: &str, child: &str) -> TaskManagerResult<()>;

    async fn assign(&self, reference: &str, actor: &str) -> TaskManagerResult<Ticket>;

    /// Assign to the identity that owns the credentials.
    async fn assign_to_self(&self, reference: &str) -> TaskManagerResult<Ticket>;

    async fn list_milestones(&self) -> TaskManagerResult<Vec<Milestone>>;

    /// Move a ticket into the milestone with the given title.
    async fn add_to_milestone(
        &self,
        reference: &str,
        milestone: &str,
    ) -> TaskManagerResult<Ticket>;

    // ------------------------------------------------------------------
    // Extended operations
    // ------------------------------------------------------------------

    /// Create a ticket. Not idempotent: never retry blindly.
    async fn create_ticket(&self, ticket: &NewTicket) -> TaskManagerResult<Ticket>;

    /// Create a ticket and link it under `parent`.
    ///
    /// If creation succeeds but linking fails the error is
    /// [`PartiallyApplied`](crate::domain::errors::TaskManagerError::PartiallyApplied).
    async fn create_subtask(&self, parent: &str, ticket: &NewTicket) -> TaskManagerResult<Ticket>;

    async fn remove_label(&self, reference: &str, label: &str) -> TaskManagerResult<()>;

    /// Link `parent` as the parent of `child`.
    async fn add_parent(&self, child: &str, parent: &str) -> TaskManagerResult<()>;

    /// Record that `reference` is blocked by `blocker`.
    async fn add_blocked_by(&self, reference: &str, blocker: &str) -> TaskManagerResult<()>;

    /// Record that `reference` blocks `blocked`.
    async fn add_blocking(&self, reference: &str, blocked: &str) -> TaskManagerResult<()>;

    /// Add a ticket to a project board. Uses the configured project number
    /// when `project_number` is `None`.
    async fn add_to_project(
        &self,
        reference: &str,
        project_number: Option<u64>,
    ) -> TaskManagerResult<Ticket>;
}
