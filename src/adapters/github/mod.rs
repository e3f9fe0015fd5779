//! GitHub task manager adapter.
//!
//! Implements the [`TaskManager`](crate::domain::ports::TaskManager) port
//! against one repository. Reads use the GraphQL API; writes use the REST
//! API v3. Ticket references are resolved through a single batched lookup
//! before any write, and project boards are found by probing the
//! repository, user and organization scopes in order.

pub mod graphql;
pub mod models;
pub mod provider;
pub mod queries;
pub mod resolver;
pub mod response;
pub mod rest;
pub mod transport;

pub use provider::GitHubTaskManager;
