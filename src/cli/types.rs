use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::domain::models::TicketStatus;

#[derive(Parser, Debug)]
#[command(name = "tasklink")]
#[command(about = "Work with GitHub issues and projects as tickets", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .tasklink/config.yaml)
    #[arg(short, long, global = true, env = "TASKLINK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable retries of transient failures
    #[arg(long, global = true)]
    pub no_retry: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ticket commands
    #[command(subcommand)]
    Ticket(TicketCommands),

    /// Comment commands
    #[command(subcommand)]
    Comment(CommentCommands),

    /// Label commands
    #[command(subcommand)]
    Label(LabelCommands),

    /// Milestone commands
    #[command(subcommand)]
    Milestone(MilestoneCommands),

    /// Link tickets to branches, pull requests and each other
    #[command(subcommand)]
    Link(LinkCommands),
}

/// Status values accepted on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusArg {
    Open,
    Closed,
}

impl From<StatusArg> for TicketStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Open => Self::Open,
            StatusArg::Closed => Self::Closed,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Filter by status
    #[arg(short, long, value_enum)]
    pub status: Option<StatusArg>,

    /// Filter by assignee login
    #[arg(short, long)]
    pub assignee: Option<String>,

    /// Filter by label name
    #[arg(short, long)]
    pub label: Option<String>,

    /// Filter by milestone title
    #[arg(short, long)]
    pub milestone: Option<String>,

    /// Maximum number of tickets (1-100)
    #[arg(long, default_value = "50")]
    pub limit: u32,
}

#[derive(Subcommand, Debug)]
pub enum TicketCommands {
    /// List tickets
    List(ListArgs),

    /// Show one ticket
    Show {
        /// Ticket number or node id
        reference: String,
    },

    /// Create a ticket, optionally as a subtask of another
    Create {
        /// Ticket title
        title: String,

        /// Ticket body
        #[arg(short, long)]
        body: Option<String>,

        /// Labels to apply (repeatable)
        #[arg(short, long = "label")]
        labels: Vec<String>,

        /// Assignee login
        #[arg(short, long)]
        assignee: Option<String>,

        /// Parent ticket to link the new ticket under
        #[arg(short, long)]
        parent: Option<String>,
    },

    /// Set a ticket's status
    Status {
        reference: String,
        #[arg(value_enum)]
        status: StatusArg,
    },

    /// Assign a ticket to a user
    Assign { reference: String, login: String },

    /// Assign a ticket to the token's owner
    AssignMe { reference: String },

    /// Move a ticket into a milestone
    Milestone {
        reference: String,
        /// Milestone title
        title: String,
    },

    /// Add a ticket to a project board
    Project {
        reference: String,
        /// Project number (defaults to github.project_number)
        #[arg(short, long)]
        number: Option<u64>,
    },
}

#[derive(Subcommand, Debug)]
pub enum CommentCommands {
    /// List comments on a ticket
    List { reference: String },

    /// Add a comment to a ticket
    Add { reference: String, body: String },
}

#[derive(Subcommand, Debug)]
pub enum LabelCommands {
    /// List labels defined in the repository, or on one ticket
    List {
        /// Only labels attached to this ticket
        #[arg(short, long)]
        ticket: Option<String>,
    },

    /// Attach an existing label to a ticket
    Add { reference: String, label: String },

    /// Remove a label from a ticket
    Remove { reference: String, label: String },
}

#[derive(Subcommand, Debug)]
pub enum MilestoneCommands {
    /// List milestones
    List,
}

#[derive(Subcommand, Debug)]
pub enum LinkCommands {
    /// Record a branch on a ticket
    Branch { reference: String, branch: String },

    /// Record a pull request on a ticket
    Pr {
        reference: String,
        /// Pull request URL or number
        pull_request: String,
    },

    /// Make CHILD a subtask of PARENT
    Subtask { parent: String, child: String },

    /// Make PARENT the parent of CHILD
    Parent { child: String, parent: String },

    /// Record that REFERENCE is blocked by BLOCKER
    BlockedBy { reference: String, blocker: String },

    /// Record that REFERENCE blocks BLOCKED
    Blocking { reference: String, blocked: String },
}
