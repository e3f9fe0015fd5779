//! GitHub implementation of the [`TaskManager`] port.
//!
//! Reads go through the GraphQL endpoint; writes go through the REST API.
//! Every write first resolves its ticket references in one batched query,
//! so a missing ticket is reported uniformly as
//! [`TaskManagerError::TicketNotFound`] before anything is written.

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info, instrument};

use crate::domain::errors::{TaskManagerError, TaskManagerResult};
use crate::domain::models::label::find_label;
use crate::domain::models::{
    Comment, GitHubConfig, Label, Milestone, NewTicket, ResolvedTicket, Scope, Ticket,
    TicketFilters, TicketRef, TicketStatus,
};
use crate::domain::ports::TaskManager;

use super::graphql::{GraphqlRequest, QueryExecutor};
use super::models::{
    comment_from_node, in_scope, label_from_node, milestone_from_node, ticket_from_node,
    BlockedByRequest, CommentRequest, CreateIssueRequest, IssueUpdateRequest, LabelsRequest,
    RestComment, RestIssue, SubIssueRequest,
};
use super::queries::{self, ResolutionExtras};
use super::resolver::IdentifierResolver;
use super::response::Node;
use super::rest::{Mutation, MutationExecutor};
use super::transport::GitHubHttp;

/// Task manager backed by one GitHub repository.
///
/// Holds only immutable configuration; concurrent calls are independent.
#[derive(Debug, Clone)]
pub struct GitHubTaskManager {
    scope: Scope,
    queries: QueryExecutor,
    mutations: MutationExecutor,
    resolver: IdentifierResolver,
}

impl GitHubTaskManager {
    pub fn new(config: GitHubConfig) -> TaskManagerResult<Self> {
        let scope = config.scope();
        let http = GitHubHttp::new(config)?;
        let queries = QueryExecutor::new(http.clone());
        Ok(Self {
            mutations: MutationExecutor::new(http, scope.clone()),
            resolver: IdentifierResolver::new(queries.clone(), scope.clone()),
            queries,
            scope,
        })
    }

    fn parse_ref(raw: &str) -> TaskManagerResult<TicketRef> {
        TicketRef::parse(raw)
    }

    fn require_text(field: &str, value: &str) -> TaskManagerResult<()> {
        if value.trim().is_empty() {
            return Err(TaskManagerError::invalid_reference(
                field,
                format!("{field} must not be empty"),
            ));
        }
        Ok(())
    }

    /// Look up one issue by reference with `by_number` / `by_id` and hand
    /// the issue node to `map`. A null or out-of-scope node is not found.
    async fn lookup_issue<T>(
        &self,
        reference: &TicketRef,
        by_number: (&'static str, &'static str),
        by_id: (&'static str, &'static str),
        map: impl Fn(&Node<'_>) -> TaskManagerResult<T> + Send,
    ) -> TaskManagerResult<T> {
        let request = match reference {
            TicketRef::Sequence(number) => GraphqlRequest::new(
                by_number.0,
                by_number.1,
                json!({ "owner": self.scope.owner, "repo": self.scope.repo, "number": number }),
            ),
            TicketRef::Opaque(id) => GraphqlRequest::new(by_id.0, by_id.1, json!({ "id": id })),
        };
        let data = self.queries.execute_lookup(&request).await?;
        let root = Node::root(&data);

        let issue = match reference {
            TicketRef::Sequence(_) => self.resolver.repository_node(&root)?.get_opt("issue"),
            TicketRef::Opaque(_) => root.get_opt("node"),
        };
        let issue = match issue {
            Some(node) if !node.is_empty_object() => node,
            _ => return Err(TaskManagerError::ticket_not_found(reference.to_string())),
        };
        if !reference.is_sequence() && !in_scope(&issue, &self.scope.full_name())? {
            return Err(TaskManagerError::ticket_not_found(reference.to_string()));
        }
        map(&issue)
    }

    async fn fetch_ticket(&self, reference: &TicketRef) -> TaskManagerResult<Ticket> {
        self.lookup_issue(
            reference,
            ("TicketByNumber", queries::TICKET_BY_NUMBER),
            ("TicketById", queries::TICKET_BY_ID),
            ticket_from_node,
        )
        .await
    }

    /// Resolve exactly two references in one round trip.
    async fn resolve_pair(
        &self,
        first: &TicketRef,
        second: &TicketRef,
    ) -> TaskManagerResult<(ResolvedTicket, ResolvedTicket)> {
        let resolution = self
            .resolver
            .resolve(&[first.clone(), second.clone()], ResolutionExtras::default())
            .await?;
        let mut tickets = resolution.tickets.into_iter();
        match (tickets.next(), tickets.next()) {
            (Some(a), Some(b)) => {
                if a.number == b.number {
                    return Err(TaskManagerError::invalid_reference(
                        second.to_string(),
                        "a ticket cannot be linked to itself",
                    ));
                }
                Ok((a, b))
            }
            _ => Err(TaskManagerError::malformed("ResolveTickets")),
        }
    }

    async fn link_sub_issue(
        &self,
        parent: &ResolvedTicket,
        child: &ResolvedTicket,
    ) -> TaskManagerResult<()> {
        self.mutations
            .send(&Mutation::AddSubIssue {
                parent_number: parent.number,
                body: SubIssueRequest {
                    sub_issue_id: child.database_id,
                },
            })
            .await?;
        info!(parent = parent.number, child = child.number, "linked sub-issue");
        Ok(())
    }

    async fn link_blocked_by(
        &self,
        blocked: &ResolvedTicket,
        blocker: &ResolvedTicket,
    ) -> TaskManagerResult<()> {
        self.mutations
            .send(&Mutation::AddBlockedBy {
                number: blocked.number,
                body: BlockedByRequest {
                    issue_id: blocker.database_id,
                },
            })
            .await?;
        info!(blocked = blocked.number, blocker = blocker.number, "linked dependency");
        Ok(())
    }

    async fn comment_on(
        &self,
        ticket: &ResolvedTicket,
        body: String,
    ) -> TaskManagerResult<Comment> {
        let comment: RestComment = self
            .mutations
            .send_json(&Mutation::AddComment {
                number: ticket.number,
                body: CommentRequest { body },
            })
            .await?;
        comment.into_comment(&ticket.id)
    }

    async fn assign_resolved(
        &self,
        ticket: &ResolvedTicket,
        actor: &str,
    ) -> TaskManagerResult<Ticket> {
        let issue: RestIssue = self
            .mutations
            .send_json(&Mutation::UpdateIssue {
                number: ticket.number,
                body: IssueUpdateRequest {
                    assignees: Some(vec![actor.to_string()]),
                    ..Default::default()
                },
            })
            .await?;
        // GitHub silently drops assignees who lack access to the repository.
        let login = issue.assignee(actor).map(str::to_string).ok_or_else(|| {
            TaskManagerError::invalid_reference(
                actor,
                format!("user cannot be assigned in {}", self.scope.full_name()),
            )
        })?;
        let mut updated = issue.into_ticket()?;
        updated.assignee = Some(login);
        Ok(updated)
    }

    async fn create_issue(&self, ticket: &NewTicket) -> TaskManagerResult<RestIssue> {
        ticket.validate()?;
        let issue: RestIssue = self
            .mutations
            .send_json(&Mutation::CreateIssue(CreateIssueRequest {
                title: ticket.title.clone(),
                body: ticket.body.clone(),
                labels: ticket.labels.clone(),
                assignees: ticket.assignee.iter().cloned().collect(),
            }))
            .await?;
        info!(number = issue.number, "created issue");
        Ok(issue)
    }
}

#[async_trait]
impl TaskManager for GitHubTaskManager {
    fn provider_name(&self) -> &'static str {
        "github"
    }

    #[instrument(skip(self))]
    async fn list_tickets(&self, filters: &TicketFilters) -> TaskManagerResult<Vec<Ticket>> {
        let search = queries::search_query(
            &self.scope.full_name(),
            filters.status.as_ref().map(TicketStatus::as_str),
            filters.assignee.as_deref(),
            filters.label.as_deref(),
            filters.milestone.as_deref(),
        );
        let request = GraphqlRequest::new(
            "ListTickets",
            queries::LIST_TICKETS,
            json!({ "searchQuery": search, "first": filters.effective_limit() }),
        );
        let data = self.queries.execute(&request).await?;
        let root = Node::root(&data);

        let tickets = root
            .nodes("search")?
            .iter()
            .filter(|node| !node.is_empty_object())
            .map(ticket_from_node)
            .collect::<TaskManagerResult<Vec<_>>>()?;
        debug!(count = tickets.len(), "listed tickets");
        Ok(tickets)
    }

    #[instrument(skip(self))]
    async fn get_ticket(&self, reference: &str) -> TaskManagerResult<Ticket> {
        let reference = Self::parse_ref(reference)?;
        self.fetch_ticket(&reference).await
    }

    #[instrument(skip(self))]
    async fn list_comments(&self, reference: &str) -> TaskManagerResult<Vec<Comment>> {
        let reference = Self::parse_ref(reference)?;
        self.lookup_issue(
            &reference,
            ("CommentsByNumber", queries::COMMENTS_BY_NUMBER),
            ("CommentsById", queries::COMMENTS_BY_ID),
            |issue| {
                let ticket_id = issue.str("id")?;
                issue
                    .nodes("comments")?
                    .iter()
                    .map(|c| comment_from_node(c, ticket_id))
                    .collect()
            },
        )
        .await
    }

    #[instrument(skip(self, body))]
    async fn add_comment(&self, reference: &str, body: &str) -> TaskManagerResult<Comment> {
        let reference = Self::parse_ref(reference)?;
        Self::require_text("body", body)?;
        let ticket = self.resolver.resolve_one(&reference).await?;
        let comment = self.comment_on(&ticket, body.to_string()).await?;
        info!(number = ticket.number, comment_id = %comment.id, "added comment");
        Ok(comment)
    }

    #[instrument(skip(self))]
    async fn list_labels(&self) -> TaskManagerResult<Vec<Label>> {
        let request = GraphqlRequest::new(
            "ListLabels",
            queries::LIST_LABELS,
            json!({ "owner": self.scope.owner, "repo": self.scope.repo }),
        );
        let data = self.queries.execute(&request).await?;
        Node::root(&data)
            .get("repository")?
            .nodes("labels")?
            .iter()
            .map(label_from_node)
            .collect()
    }

    #[instrument(skip(self))]
    async fn list_ticket_labels(&self, reference: &str) -> TaskManagerResult<Vec<Label>> {
        let reference = Self::parse_ref(reference)?;
        self.lookup_issue(
            &reference,
            ("TicketLabelsByNumber", queries::TICKET_LABELS_BY_NUMBER),
            ("TicketLabelsById", queries::TICKET_LABELS_BY_ID),
            |issue| issue.nodes("labels")?.iter().map(label_from_node).collect(),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn add_label(&self, reference: &str, label: &str) -> TaskManagerResult<()> {
        let reference = Self::parse_ref(reference)?;
        Self::require_text("label", label)?;
        let resolution = self
            .resolver
            .resolve(
                std::slice::from_ref(&reference),
                ResolutionExtras {
                    labels: true,
                    ..Default::default()
                },
            )
            .await?;
        let existing = find_label(&resolution.labels, label)
            .ok_or_else(|| TaskManagerError::LabelNotFound(label.to_string()))?;
        let ticket = resolution
            .tickets
            .first()
            .ok_or_else(|| TaskManagerError::ticket_not_found(reference.to_string()))?;

        self.mutations
            .send(&Mutation::AddLabels {
                number: ticket.number,
                body: LabelsRequest {
                    labels: vec![existing.name.clone()],
                },
            })
            .await?;
        info!(number = ticket.number, label, "added label");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_status(
        &self,
        reference: &str,
        status: TicketStatus,
    ) -> TaskManagerResult<Ticket> {
        let reference = Self::parse_ref(reference)?;
        let ticket = self.resolver.resolve_one(&reference).await?;
        let issue: RestIssue = self
            .mutations
            .send_json(&Mutation::UpdateIssue {
                number: ticket.number,
                body: IssueUpdateRequest {
                    state: Some(status.as_str().to_string()),
                    ..Default::default()
                },
            })
            .await?;
        info!(number = ticket.number, status = status.as_str(), "updated status");
        issue.into_ticket()
    }

    #[instrument(skip(self))]
    async fn add_branch(&self, reference: &str, branch: &str) -> TaskManagerResult<()> {
        let reference = Self::parse_ref(reference)?;
        Self::require_text("branch", branch)?;
        let ticket = self.resolver.resolve_one(&reference).await?;
        self.comment_on(&ticket, format!("Linked branch: `{}`", branch.trim()))
            .await?;
        info!(number = ticket.number, branch, "linked branch");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn add_pull_request(&self, reference: &str, pull_request: &str) -> TaskManagerResult<()> {
        let reference = Self::parse_ref(reference)?;
        Self::require_text("pull_request", pull_request)?;
        let ticket = self.resolver.resolve_one(&reference).await?;
        self.comment_on(
            &ticket,
            format!("Linked pull request: {}", pull_request.trim()),
        )
        .await?;
        info!(number = ticket.number, pull_request, "linked pull request");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn add_subtask(&self, parent: &str, child: &str) -> TaskManagerResult<()> {
        let parent = Self::parse_ref(parent)?;
        let child = Self::parse_ref(child)?;
        let (parent, child) = self.resolve_pair(&parent, &child).await?;
        self.link_sub_issue(&parent, &child).await
    }

    #[instrument(skip(self))]
    async fn assign(&self, reference: &str, actor: &str) -> TaskManagerResult<Ticket> {
        let reference = Self::parse_ref(reference)?;
        Self::require_text("assignee", actor)?;
        let ticket = self.resolver.resolve_one(&reference).await?;
        let updated = self.assign_resolved(&ticket, actor.trim()).await?;
        info!(number = ticket.number, assignee = actor, "assigned ticket");
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn assign_to_self(&self, reference: &str) -> TaskManagerResult<Ticket> {
        let reference = Self::parse_ref(reference)?;
        let resolution = self
            .resolver
            .resolve(
                std::slice::from_ref(&reference),
                ResolutionExtras {
                    viewer: true,
                    ..Default::default()
                },
            )
            .await?;
        let viewer = resolution
            .viewer
            .ok_or_else(|| TaskManagerError::malformed("viewer.login"))?;
        let ticket = resolution
            .tickets
            .first()
            .ok_or_else(|| TaskManagerError::ticket_not_found(reference.to_string()))?;
        let updated = self.assign_resolved(ticket, &viewer).await?;
        info!(number = ticket.number, assignee = %viewer, "assigned ticket to self");
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn list_milestones(&self) -> TaskManagerResult<Vec<Milestone>> {
        let request = GraphqlRequest::new(
            "ListMilestones",
            queries::LIST_MILESTONES,
            json!({ "owner": self.scope.owner, "repo": self.scope.repo }),
        );
        let data = self.queries.execute(&request).await?;
        Node::root(&data)
            .get("repository")?
            .nodes("milestones")?
            .iter()
            .map(milestone_from_node)
            .collect()
    }

    #[instrument(skip(self))]
    async fn add_to_milestone(
        &self,
        reference: &str,
        milestone: &str,
    ) -> TaskManagerResult<Ticket> {
        let reference = Self::parse_ref(reference)?;
        Self::require_text("milestone", milestone)?;
        let resolution = self
            .resolver
            .resolve(
                std::slice::from_ref(&reference),
                ResolutionExtras {
                    milestones: true,
                    ..Default::default()
                },
            )
            .await?;
        let target = resolution
            .milestones
            .iter()
            .find(|m| m.milestone.title == milestone)
            .ok_or_else(|| TaskManagerError::MilestoneNotFound(milestone.to_string()))?;
        let ticket = resolution
            .tickets
            .first()
            .ok_or_else(|| TaskManagerError::ticket_not_found(reference.to_string()))?;

        let issue: RestIssue = self
            .mutations
            .send_json(&Mutation::UpdateIssue {
                number: ticket.number,
                body: IssueUpdateRequest {
                    milestone: Some(target.number),
                    ..Default::default()
                },
            })
            .await?;
        info!(number = ticket.number, milestone, "moved ticket to milestone");
        issue.into_ticket()
    }

    #[instrument(skip(self, ticket), fields(title = %ticket.title))]
    async fn create_ticket(&self, ticket: &NewTicket) -> TaskManagerResult<Ticket> {
        self.create_issue(ticket).await?.into_ticket()
    }

    #[instrument(skip(self, ticket), fields(title = %ticket.title))]
    async fn create_subtask(&self, parent: &str, ticket: &NewTicket) -> TaskManagerResult<Ticket> {
        let parent = Self::parse_ref(parent)?;
        ticket.validate()?;
        let parent = self.resolver.resolve_one(&parent).await?;
        let parent_ref = format!("Part of #{}", parent.number);
        let subtask = NewTicket {
            body: Some(match ticket.body.as_deref().filter(|b| !b.trim().is_empty()) {
                Some(body) => format!("{parent_ref}\n\n{body}"),
                None => parent_ref,
            }),
            ..ticket.clone()
        };
        let issue = self.create_issue(&subtask).await?;

        if let Err(source) = self.link_sub_issue(&parent, &issue.resolved()).await {
            return Err(TaskManagerError::PartiallyApplied {
                applied: format!("created ticket #{} ({})", issue.number, issue.node_id),
                source: Box::new(source),
            });
        }
        issue.into_ticket()
    }

    #[instrument(skip(self))]
    async fn remove_label(&self, reference: &str, label: &str) -> TaskManagerResult<()> {
        let reference = Self::parse_ref(reference)?;
        Self::require_text("label", label)?;
        let ticket = self.resolver.resolve_one(&reference).await?;
        let result = self
            .mutations
            .send(&Mutation::RemoveLabel {
                number: ticket.number,
                name: label.to_string(),
            })
            .await;
        match result {
            Ok(_) => {
                info!(number = ticket.number, label, "removed label");
                Ok(())
            }
            // The ticket is known to exist, so a 404 names the label.
            Err(TaskManagerError::RemoteWriteError { status: 404, .. }) => {
                Err(TaskManagerError::LabelNotFound(label.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self))]
    async fn add_parent(&self, child: &str, parent: &str) -> TaskManagerResult<()> {
        let child = Self::parse_ref(child)?;
        let parent = Self::parse_ref(parent)?;
        let (parent, child) = self.resolve_pair(&parent, &child).await?;
        self.link_sub_issue(&parent, &child).await
    }

    #[instrument(skip(self))]
    async fn add_blocked_by(&self, reference: &str, blocker: &str) -> TaskManagerResult<()> {
        let blocked = Self::parse_ref(reference)?;
        let blocker = Self::parse_ref(blocker)?;
        let (blocked, blocker) = self.resolve_pair(&blocked, &blocker).await?;
        self.link_blocked_by(&blocked, &blocker).await
    }

    #[instrument(skip(self))]
    async fn add_blocking(&self, reference: &str, blocked: &str) -> TaskManagerResult<()> {
        let blocker = Self::parse_ref(reference)?;
        let blocked = Self::parse_ref(blocked)?;
        let (blocked, blocker) = self.resolve_pair(&blocked, &blocker).await?;
        self.link_blocked_by(&blocked, &blocker).await
    }

    #[instrument(skip(self))]
    async fn add_to_project(
        &self,
        reference: &str,
        project_number: Option<u64>,
    ) -> TaskManagerResult<Ticket> {
        let reference = Self::parse_ref(reference)?;
        let number = project_number
            .or(self.scope.project_number)
            .ok_or_else(|| {
                TaskManagerError::invalid_reference(
                    "project_number",
                    "no project number given and none configured",
                )
            })?;
        if number == 0 {
            return Err(TaskManagerError::invalid_reference(
                "project_number",
                "project numbers start at 1",
            ));
        }

        let (ticket, project) = self
            .resolver
            .resolve_with_project(&reference, number)
            .await?;

        let request = GraphqlRequest::new(
            "AddProjectItem",
            queries::ADD_PROJECT_ITEM,
            json!({ "projectId": project.id, "contentId": ticket.id }),
        );
        let data = self.queries.execute(&request).await?;
        let content = Node::root(&data)
            .get("addProjectV2ItemById")?
            .get("item")?
            .get("content")?;
        let updated = ticket_from_node(&content)?;
        info!(
            number = ticket.number,
            project = number,
            project_title = %project.title,
            project_scope = project.scope.as_str(),
            "added ticket to project"
        );
        Ok(updated)
    }
}
