//! Command-line front end.
//!
//! Loads configuration, builds the GitHub adapter, runs one operation and
//! prints the result as JSON or text.

pub mod commands;
pub mod output;
pub mod types;

use serde_json::json;

use crate::domain::errors::TaskManagerError;
use crate::infrastructure::config::ConfigError;

pub use types::{Cli, Commands};

/// Process exit code for a failed command.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<ConfigError>().is_some() {
        return 2;
    }
    match err.downcast_ref::<TaskManagerError>() {
        Some(TaskManagerError::InvalidReference { .. } | TaskManagerError::Configuration(_)) => 2,
        Some(
            TaskManagerError::TicketNotFound { .. }
            | TaskManagerError::ProjectNotFound { .. }
            | TaskManagerError::LabelNotFound(_)
            | TaskManagerError::MilestoneNotFound(_),
        ) => 3,
        Some(
            TaskManagerError::RemoteQueryError { .. }
            | TaskManagerError::RemoteWriteError { .. }
            | TaskManagerError::MalformedResponse { .. }
            | TaskManagerError::PartiallyApplied { .. },
        ) => 4,
        Some(TaskManagerError::TransportError { .. }) => 5,
        None => 1,
    }
}

/// Short machine-readable name of the error kind.
fn error_kind(err: &anyhow::Error) -> &'static str {
    if err.downcast_ref::<ConfigError>().is_some() {
        return "configuration";
    }
    match err.downcast_ref::<TaskManagerError>() {
        Some(TaskManagerError::InvalidReference { .. }) => "invalid_reference",
        Some(TaskManagerError::TicketNotFound { .. }) => "ticket_not_found",
        Some(TaskManagerError::ProjectNotFound { .. }) => "project_not_found",
        Some(TaskManagerError::LabelNotFound(_)) => "label_not_found",
        Some(TaskManagerError::MilestoneNotFound(_)) => "milestone_not_found",
        Some(TaskManagerError::RemoteQueryError { .. }) => "remote_query_error",
        Some(TaskManagerError::RemoteWriteError { .. }) => "remote_write_error",
        Some(TaskManagerError::TransportError { .. }) => "transport_error",
        Some(TaskManagerError::MalformedResponse { .. }) => "malformed_response",
        Some(TaskManagerError::PartiallyApplied { .. }) => "partially_applied",
        Some(TaskManagerError::Configuration(_)) => "configuration",
        None => "error",
    }
}

/// Report a failed command on stderr and exit.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = json!({
            "error": error_kind(&err),
            "message": format!("{err:#}"),
        });
        eprintln!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(exit_code(&err));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_kind() {
        let not_found = anyhow::Error::from(TaskManagerError::ticket_not_found("42"));
        assert_eq!(exit_code(&not_found), 3);
        assert_eq!(error_kind(&not_found), "ticket_not_found");

        let transport = anyhow::Error::from(TaskManagerError::transport("timeout"));
        assert_eq!(exit_code(&transport), 5);

        let config = anyhow::Error::from(ConfigError::MissingToken);
        assert_eq!(exit_code(&config), 2);
        assert_eq!(error_kind(&config), "configuration");

        let other = anyhow::anyhow!("boom");
        assert_eq!(exit_code(&other), 1);
        assert_eq!(error_kind(&other), "error");
    }

    #[test]
    fn test_context_does_not_hide_kind() {
        let err = anyhow::Error::from(TaskManagerError::invalid_reference("", "empty"))
            .context("while running ticket show");
        assert_eq!(exit_code(&err), 2);
    }
}
