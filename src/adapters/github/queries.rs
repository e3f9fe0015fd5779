//! GraphQL documents for GitHub reads and project linking.
//!
//! Each document carries a distinct operation name so requests are easy to
//! tell apart in logs and mock servers. Documents request exactly the fields
//! the mapping layer reads.

use std::fmt::Write as _;

use crate::domain::models::TicketRef;

/// Fields read for a full [`Ticket`](crate::domain::models::Ticket).
macro_rules! ticket_fields {
    () => {
        "fragment TicketFields on Issue {
  id
  number
  title
  body
  state
  url
  createdAt
  updatedAt
  repository { nameWithOwner }
  assignees(first: 10) { nodes { login } }
  labels(first: 20) { nodes { name } }
  milestone { title }
}
"
    };
}

/// Fields read when resolving a reference to concrete identifiers.
macro_rules! resolved_fields {
    () => {
        "fragment ResolvedFields on Issue {
  id
  number
  databaseId
  repository { nameWithOwner }
}
"
    };
}

pub const LIST_TICKETS: &str = concat!(
    "query ListTickets($searchQuery: String!, $first: Int!) {
  search(query: $searchQuery, type: ISSUE, first: $first) {
    nodes { ... on Issue { ...TicketFields } }
  }
}
",
    ticket_fields!()
);

pub const TICKET_BY_NUMBER: &str = concat!(
    "query TicketByNumber($owner: String!, $repo: String!, $number: Int!) {
  repository(owner: $owner, name: $repo) {
    issue(number: $number) { ...TicketFields }
  }
}
",
    ticket_fields!()
);

pub const TICKET_BY_ID: &str = concat!(
    "query TicketById($id: ID!) {
  node(id: $id) { ... on Issue { ...TicketFields } }
}
",
    ticket_fields!()
);

pub const COMMENTS_BY_NUMBER: &str = "query CommentsByNumber($owner: String!, $repo: String!, $number: Int!) {
  repository(owner: $owner, name: $repo) {
    issue(number: $number) {
      id
      comments(first: 100) {
        nodes { id body url createdAt author { login } }
      }
    }
  }
}
";

pub const COMMENTS_BY_ID: &str = "query CommentsById($id: ID!) {
  node(id: $id) {
    ... on Issue {
      id
      repository { nameWithOwner }
      comments(first: 100) {
        nodes { id body url createdAt author { login } }
      }
    }
  }
}
";

pub const LIST_LABELS: &str = "query ListLabels($owner: String!, $repo: String!) {
  repository(owner: $owner, name: $repo) {
    labels(first: 100) { nodes { name color description } }
  }
}
";

pub const TICKET_LABELS_BY_NUMBER: &str = "query TicketLabelsByNumber($owner: String!, $repo: String!, $number: Int!) {
  repository(owner: $owner, name: $repo) {
    issue(number: $number) {
      labels(first: 100) { nodes { name color description } }
    }
  }
}
";

pub const TICKET_LABELS_BY_ID: &str = "query TicketLabelsById($id: ID!) {
  node(id: $id) {
    ... on Issue {
      repository { nameWithOwner }
      labels(first: 100) { nodes { name color description } }
    }
  }
}
";

pub const LIST_MILESTONES: &str = "query ListMilestones($owner: String!, $repo: String!) {
  repository(owner: $owner, name: $repo) {
    milestones(first: 100, states: [OPEN, CLOSED]) {
      nodes { title description dueOn state url }
    }
  }
}
";

pub const USER_PROJECT: &str = "query UserProject($login: String!, $number: Int!) {
  user(login: $login) {
    projectV2(number: $number) { id title }
  }
}
";

pub const ORGANIZATION_PROJECT: &str = "query OrganizationProject($login: String!, $number: Int!) {
  organization(login: $login) {
    projectV2(number: $number) { id title }
  }
}
";

pub const ADD_PROJECT_ITEM: &str = concat!(
    "mutation AddProjectItem($projectId: ID!, $contentId: ID!) {
  addProjectV2ItemById(input: { projectId: $projectId, contentId: $contentId }) {
    item {
      id
      content { ... on Issue { ...TicketFields } }
    }
  }
}
",
    ticket_fields!()
);

/// Extra lookups folded into a resolution query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionExtras {
    /// Login of the credential owner.
    pub viewer: bool,
    /// All labels in the repository.
    pub labels: bool,
    /// All milestones (with their numbers) in the repository.
    pub milestones: bool,
    /// The repository-scoped project board with this number.
    pub project: Option<u64>,
}

/// Alias under which the `index`th reference is looked up.
pub fn ticket_alias(index: usize) -> String {
    format!("t{index}")
}

/// Build the single batched query that resolves every reference in `refs`
/// plus any requested extras.
///
/// Sequence references are looked up through the repository, opaque ones
/// through `node`; each under its own alias so one response answers all.
pub fn resolution_query(refs: &[TicketRef], extras: ResolutionExtras) -> String {
    let mut params = Vec::new();
    let mut repository_fields = String::new();
    let mut root_fields = String::new();

    for (index, reference) in refs.iter().enumerate() {
        let alias = ticket_alias(index);
        match reference {
            TicketRef::Sequence(_) => {
                params.push(format!("$n{index}: Int!"));
                let _ = writeln!(
                    repository_fields,
                    "    {alias}: issue(number: $n{index}) {{ ...ResolvedFields }}"
                );
            }
            TicketRef::Opaque(_) => {
                params.push(format!("$id{index}: ID!"));
                let _ = writeln!(
                    root_fields,
                    "  {alias}: node(id: $id{index}) {{ ... on Issue {{ ...ResolvedFields }} }}"
                );
            }
        }
    }

    if extras.labels {
        repository_fields.push_str("    labels(first: 100) { nodes { name color description } }\n");
    }
    if extras.milestones {
        repository_fields.push_str(
            "    milestones(first: 100, states: [OPEN, CLOSED]) { nodes { number title description dueOn state url } }\n",
        );
    }
    if extras.project.is_some() {
        params.push("$project: Int!".to_string());
        repository_fields.push_str("    projectV2(number: $project) { id title }\n");
    }
    if extras.viewer {
        root_fields.push_str("  viewer { login }\n");
    }

    let mut query = String::from("query ResolveTickets");
    if !repository_fields.is_empty() {
        params.insert(0, "$repo: String!".to_string());
        params.insert(0, "$owner: String!".to_string());
    }
    if !params.is_empty() {
        let _ = write!(query, "({})", params.join(", "));
    }
    query.push_str(" {\n");
    if !repository_fields.is_empty() {
        query.push_str("  repository(owner: $owner, name: $repo) {\n");
        query.push_str(&repository_fields);
        query.push_str("  }\n");
    }
    query.push_str(&root_fields);
    query.push_str("}\n");
    if !refs.is_empty() {
        query.push_str(resolved_fields!());
    }
    query
}

/// Quote a search qualifier value when it contains whitespace.
fn qualifier_value(value: &str) -> String {
    if value.chars().any(char::is_whitespace) {
        format!("\"{}\"", value.replace('"', ""))
    } else {
        value.to_string()
    }
}

/// Build the issue search string for `owner/repo` and the given filters.
pub fn search_query(
    full_name: &str,
    status: Option<&str>,
    assignee: Option<&str>,
    label: Option<&str>,
    milestone: Option<&str>,
) -> String {
    let mut parts = vec![format!("repo:{full_name}"), "is:issue".to_string()];
    if let Some(status) = status {
        parts.push(format!("is:{status}"));
    }
    if let Some(assignee) = assignee {
        parts.push(format!("assignee:{}", qualifier_value(assignee)));
    }
    if let Some(label) = label {
        parts.push(format!("label:{}", qualifier_value(label)));
    }
    if let Some(milestone) = milestone {
        parts.push(format!("milestone:{}", qualifier_value(milestone)));
    }
    parts.join(" ")
}
