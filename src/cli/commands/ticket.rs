use anyhow::Result;

use crate::cli::output::{output, TicketList};
use crate::cli::types::{ListArgs, TicketCommands};
use crate::domain::models::{NewTicket, TicketFilters, TicketStatus};
use crate::domain::ports::Operation;

use super::CommandContext;

pub async fn execute(command: TicketCommands, ctx: &CommandContext, json: bool) -> Result<()> {
    let manager = ctx.manager();
    match command {
        TicketCommands::List(args) => {
            let filters = filters_from(&args);
            let filters = &filters;
            let tickets = ctx
                .run(Operation::ListTickets, move || manager.list_tickets(filters))
                .await?;
            output(&TicketList(tickets), json);
        }
        TicketCommands::Show { reference } => {
            let reference = reference.as_str();
            let ticket = ctx
                .run(Operation::GetTicket, move || manager.get_ticket(reference))
                .await?;
            output(&ticket, json);
        }
        TicketCommands::Create {
            title,
            body,
            labels,
            assignee,
            parent,
        } => {
            let new_ticket = NewTicket {
                title,
                body,
                labels,
                assignee,
            };
            let new_ticket = &new_ticket;
            let ticket = match parent.as_deref() {
                Some(parent) => {
                    ctx.run(Operation::CreateSubtask, move || {
                        manager.create_subtask(parent, new_ticket)
                    })
                    .await?
                }
                None => {
                    ctx.run(Operation::CreateTicket, move || {
                        manager.create_ticket(new_ticket)
                    })
                    .await?
                }
            };
            output(&ticket, json);
        }
        TicketCommands::Status { reference, status } => {
            let reference = reference.as_str();
            let status = TicketStatus::from(status);
            let ticket = ctx
                .run(Operation::UpdateStatus, move || {
                    manager.update_status(reference, status)
                })
                .await?;
            output(&ticket, json);
        }
        TicketCommands::Assign { reference, login } => {
            let (reference, login) = (reference.as_str(), login.as_str());
            let ticket = ctx
                .run(Operation::Assign, move || manager.assign(reference, login))
                .await?;
            output(&ticket, json);
        }
        TicketCommands::AssignMe { reference } => {
            let reference = reference.as_str();
            let ticket = ctx
                .run(Operation::AssignToSelf, move || {
                    manager.assign_to_self(reference)
                })
                .await?;
            output(&ticket, json);
        }
        TicketCommands::Milestone { reference, title } => {
            let (reference, title) = (reference.as_str(), title.as_str());
            let ticket = ctx
                .run(Operation::AddToMilestone, move || {
                    manager.add_to_milestone(reference, title)
                })
                .await?;
            output(&ticket, json);
        }
        TicketCommands::Project { reference, number } => {
            let reference = reference.as_str();
            let ticket = ctx
                .run(Operation::AddToProject, move || {
                    manager.add_to_project(reference, number)
                })
                .await?;
            output(&ticket, json);
        }
    }
    Ok(())
}

fn filters_from(args: &ListArgs) -> TicketFilters {
    TicketFilters {
        status: args.status.map(TicketStatus::from),
        assignee: args.assignee.clone(),
        label: args.label.clone(),
        milestone: args.milestone.clone(),
        limit: Some(args.limit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::types::StatusArg;

    #[test]
    fn test_filters_from_args() {
        let args = ListArgs {
            status: Some(StatusArg::Closed),
            assignee: None,
            label: Some("bug".to_string()),
            milestone: None,
            limit: 500,
        };
        let filters = filters_from(&args);
        assert_eq!(filters.status, Some(TicketStatus::Closed));
        assert_eq!(filters.label.as_deref(), Some("bug"));
        assert_eq!(filters.effective_limit(), 100);
    }
}
