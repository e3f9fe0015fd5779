//! Reference resolution.
//!
//! Turns caller references into concrete identifiers with one batched
//! lookup, and finds project boards by probing the repository, user and
//! organization scopes in that order. The repository probe rides along
//! with the ticket lookup.

use serde_json::{json, Map, Value};
use tracing::{debug, instrument};

use crate::domain::errors::{ProjectScope, QueryErrorEntry, TaskManagerError, TaskManagerResult};
use crate::domain::models::{Label, Milestone, ResolvedTicket, Scope, TicketRef};

use super::graphql::{GraphqlRequest, QueryExecutor};
use super::models::{in_scope, label_from_node, milestone_from_node, resolved_from_node};
use super::queries::{self, ResolutionExtras};
use super::response::Node;

/// A milestone together with the number REST writes address it by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedMilestone {
    pub number: u64,
    pub milestone: Milestone,
}

/// Result of a batched resolution.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// One entry per requested reference, in request order.
    pub tickets: Vec<ResolvedTicket>,
    pub viewer: Option<String>,
    pub labels: Vec<Label>,
    pub milestones: Vec<NumberedMilestone>,
    /// The repository-scoped project, when one was requested and exists.
    pub project: Option<ResolvedProject>,
}

/// A project board located by number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProject {
    pub id: String,
    pub title: String,
    pub scope: ProjectScope,
}

#[derive(Debug, Clone)]
pub struct IdentifierResolver {
    queries: QueryExecutor,
    scope: Scope,
}

impl IdentifierResolver {
    pub const fn new(queries: QueryExecutor, scope: Scope) -> Self {
        Self { queries, scope }
    }

    /// Resolve every reference in `refs` plus the requested extras in a
    /// single round trip.
    ///
    /// Fails with [`TaskManagerError::TicketNotFound`] naming the first
    /// reference that does not resolve to an issue in this repository.
    #[instrument(skip(self), fields(count = refs.len()))]
    pub async fn resolve(
        &self,
        refs: &[TicketRef],
        extras: ResolutionExtras,
    ) -> TaskManagerResult<Resolution> {
        if refs.is_empty() && extras == ResolutionExtras::default() {
            return Ok(Resolution::default());
        }

        let needs_repository = extras.labels
            || extras.milestones
            || extras.project.is_some()
            || refs.iter().any(TicketRef::is_sequence);

        let mut variables = Map::new();
        if needs_repository {
            variables.insert("owner".to_string(), json!(self.scope.owner));
            variables.insert("repo".to_string(), json!(self.scope.repo));
        }
        for (index, reference) in refs.iter().enumerate() {
            match reference {
                TicketRef::Sequence(n) => variables.insert(format!("n{index}"), json!(n)),
                TicketRef::Opaque(id) => variables.insert(format!("id{index}"), json!(id)),
            };
        }
        if let Some(number) = extras.project {
            variables.insert("project".to_string(), json!(number));
        }

        let request = GraphqlRequest::new(
            "ResolveTickets",
            queries::resolution_query(refs, extras),
            Value::Object(variables),
        );
        let data = self.queries.execute_lookup(&request).await?;
        let root = Node::root(&data);

        let repository = if needs_repository {
            Some(self.repository_node(&root)?)
        } else {
            None
        };

        let full_name = self.scope.full_name();
        let mut resolution = Resolution::default();
        for (index, reference) in refs.iter().enumerate() {
            let alias = queries::ticket_alias(index);
            let node = match (reference, &repository) {
                (TicketRef::Sequence(_), Some(repo)) => repo.get_opt(&alias),
                _ => root.get_opt(&alias),
            };
            let node = match node {
                Some(node) if !node.is_empty_object() => node,
                _ => return Err(TaskManagerError::ticket_not_found(reference.to_string())),
            };
            if !reference.is_sequence() && !in_scope(&node, &full_name)? {
                debug!(%reference, "node belongs to another repository");
                return Err(TaskManagerError::ticket_not_found(reference.to_string()));
            }
            resolution.tickets.push(resolved_from_node(&node)?);
        }

        if extras.viewer {
            resolution.viewer = Some(root.get("viewer")?.str("login")?.to_string());
        }
        if let Some(repo) = &repository {
            if extras.labels {
                resolution.labels = repo
                    .nodes("labels")?
                    .iter()
                    .map(label_from_node)
                    .collect::<TaskManagerResult<_>>()?;
            }
            if extras.milestones {
                resolution.milestones = repo
                    .nodes("milestones")?
                    .iter()
                    .map(|m| {
                        Ok(NumberedMilestone {
                            number: m.u64("number")?,
                            milestone: milestone_from_node(m)?,
                        })
                    })
                    .collect::<TaskManagerResult<_>>()?;
            }
            if extras.project.is_some() {
                resolution.project = repo
                    .get_opt("projectV2")
                    .map(|p| project_from_node(&p, ProjectScope::Repository))
                    .transpose()?;
            }
        }

        Ok(resolution)
    }

    /// Resolve a single reference.
    pub async fn resolve_one(&self, reference: &TicketRef) -> TaskManagerResult<ResolvedTicket> {
        let resolution = self
            .resolve(std::slice::from_ref(reference), ResolutionExtras::default())
            .await?;
        resolution
            .tickets
            .into_iter()
            .next()
            .ok_or_else(|| TaskManagerError::ticket_not_found(reference.to_string()))
    }

    /// The repository node of a lookup response; null means the configured
    /// repository does not exist or is not visible to the token.
    pub fn repository_node<'a>(&self, root: &Node<'a>) -> TaskManagerResult<Node<'a>> {
        root.get_opt("repository").ok_or_else(|| TaskManagerError::RemoteQueryError {
            errors: vec![QueryErrorEntry::new(
                "repository",
                format!(
                    "Could not resolve to a Repository with the name '{}'",
                    self.scope.full_name()
                ),
            )],
        })
    }

    /// Resolve `reference` and locate project `number`.
    ///
    /// The repository scope is probed inside the resolution query. Only if
    /// the repository has no such project are the user and organization
    /// scopes probed, in that order, stopping at the first hit.
    #[instrument(skip(self))]
    pub async fn resolve_with_project(
        &self,
        reference: &TicketRef,
        number: u64,
    ) -> TaskManagerResult<(ResolvedTicket, ResolvedProject)> {
        let extras = ResolutionExtras {
            project: Some(number),
            ..Default::default()
        };
        let resolved = self.resolve(std::slice::from_ref(reference), extras).await;
        let (ticket, project) = match resolved {
            Ok(resolution) => {
                let ticket = resolution
                    .tickets
                    .into_iter()
                    .next()
                    .ok_or_else(|| TaskManagerError::ticket_not_found(reference.to_string()))?;
                (ticket, resolution.project)
            }
            // The token may not read repository projects; the ticket lookup
            // alone can still succeed.
            Err(TaskManagerError::RemoteQueryError { errors })
                if errors.iter().all(|e| e.path.starts_with(REPOSITORY_PROJECT_PATH)) =>
            {
                debug!(errors = ?errors, "repository project probe rejected");
                (self.resolve_one(reference).await?, None)
            }
            Err(e) => return Err(e),
        };

        if let Some(project) = project {
            debug!(scope = "repository", project_id = %project.id, "project resolved");
            return Ok((ticket, project));
        }

        let mut tried = vec![ProjectScope::Repository];
        for scope in [ProjectScope::User, ProjectScope::Organization] {
            if let Some(project) = self.probe_owner_project(scope, number).await? {
                debug!(scope = scope.as_str(), project_id = %project.id, "project resolved");
                return Ok((ticket, project));
            }
            tried.push(scope);
        }
        Err(TaskManagerError::ProjectNotFound { number, tried })
    }

    /// Probe the user or organization named like the repository owner.
    async fn probe_owner_project(
        &self,
        scope: ProjectScope,
        number: u64,
    ) -> TaskManagerResult<Option<ResolvedProject>> {
        let (operation, query, owner_key) = match scope {
            ProjectScope::User => ("UserProject", queries::USER_PROJECT, "user"),
            ProjectScope::Organization => (
                "OrganizationProject",
                queries::ORGANIZATION_PROJECT,
                "organization",
            ),
            // Answered by the resolution query.
            ProjectScope::Repository => return Ok(None),
        };

        let request = GraphqlRequest::new(
            operation,
            query,
            json!({ "login": self.scope.owner, "number": number }),
        );
        let data = match self.queries.execute_lookup(&request).await {
            Ok(data) => data,
            // A scope the owner does not belong to, or cannot be read with
            // this token, is simply not where the project lives.
            Err(TaskManagerError::RemoteQueryError { errors }) => {
                debug!(
                    scope = scope.as_str(),
                    errors = ?errors,
                    "project probe rejected, trying next scope"
                );
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let root = Node::root(&data);
        root.get_opt(owner_key)
            .and_then(|owner| owner.get_opt("projectV2"))
            .map(|project| project_from_node(&project, scope))
            .transpose()
    }
}

/// Error path prefix of the project field in the resolution query.
const REPOSITORY_PROJECT_PATH: &str = "repository.projectV2";

fn project_from_node(node: &Node<'_>, scope: ProjectScope) -> TaskManagerResult<ResolvedProject> {
    Ok(ResolvedProject {
        id: node.str("id")?.to_string(),
        title: node.str("title")?.to_string(),
        scope,
    })
}
