use anyhow::Result;

use crate::cli::output::{output, Done, LabelList};
use crate::cli::types::LabelCommands;
use crate::domain::ports::Operation;

use super::CommandContext;

pub async fn execute(command: LabelCommands, ctx: &CommandContext, json: bool) -> Result<()> {
    let manager = ctx.manager();
    match command {
        LabelCommands::List { ticket: None } => {
            let labels = ctx
                .run(Operation::ListLabels, move || manager.list_labels())
                .await?;
            output(&LabelList(labels), json);
        }
        LabelCommands::List {
            ticket: Some(reference),
        } => {
            let reference = reference.as_str();
            let labels = ctx
                .run(Operation::ListTicketLabels, move || {
                    manager.list_ticket_labels(reference)
                })
                .await?;
            output(&LabelList(labels), json);
        }
        LabelCommands::Add { reference, label } => {
            let (reference, name) = (reference.as_str(), label.as_str());
            ctx.run(Operation::AddLabel, move || manager.add_label(reference, name))
                .await?;
            output(&Done::new(format!("Added label '{label}' to {reference}")), json);
        }
        LabelCommands::Remove { reference, label } => {
            let (reference, name) = (reference.as_str(), label.as_str());
            ctx.run(Operation::RemoveLabel, move || {
                manager.remove_label(reference, name)
            })
            .await?;
            output(
                &Done::new(format!("Removed label '{label}' from {reference}")),
                json,
            );
        }
    }
    Ok(())
}
