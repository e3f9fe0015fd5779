//! Tasklink - task manager abstraction over GitHub
//!
//! Tasklink presents GitHub issues, comments, labels, milestones and project
//! boards through a provider-neutral [`TaskManager`] port. The GitHub adapter
//! reads over the GraphQL API and writes over the REST API, resolving
//! caller-supplied ticket references (issue numbers or node ids) centrally.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): entities, references, errors and the port
//! - **Adapters** (`adapters`): the GitHub implementation of the port
//! - **Infrastructure Layer** (`infrastructure`): configuration, logging, retries
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```no_run
//! use tasklink::{GitHubConfig, GitHubTaskManager, TaskManager};
//!
//! # async fn example() -> Result<(), tasklink::TaskManagerError> {
//! let manager = GitHubTaskManager::new(GitHubConfig::new("ghp_token", "octo", "widgets"))?;
//! let ticket = manager.get_ticket("42").await?;
//! println!("{} is {}", ticket.title, ticket.status);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use adapters::github::GitHubTaskManager;
pub use domain::errors::{ProjectScope, QueryErrorEntry, TaskManagerError, TaskManagerResult};
pub use domain::models::{
    Comment, Config, GitHubConfig, Label, LoggingConfig, Milestone, MilestoneState, NewTicket,
    ResolvedTicket, RetryConfig, Scope, Ticket, TicketFilters, TicketRef, TicketStatus,
};
pub use domain::ports::{Operation, TaskManager};
pub use infrastructure::config::{ConfigError, ConfigLoader};
