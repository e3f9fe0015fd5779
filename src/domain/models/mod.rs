pub mod comment;
pub mod config;
pub mod label;
pub mod milestone;
pub mod reference;
pub mod scope;
pub mod ticket;

pub use comment::Comment;
pub use config::{Config, GitHubConfig, LoggingConfig, RetryConfig};
pub use label::Label;
pub use milestone::{Milestone, MilestoneState};
pub use reference::{ResolvedTicket, TicketRef};
pub use scope::Scope;
pub use ticket::{NewTicket, Ticket, TicketFilters, TicketStatus};
