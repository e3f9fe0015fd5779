use anyhow::Result;

use crate::cli::output::{output, MilestoneList};
use crate::cli::types::MilestoneCommands;
use crate::domain::ports::Operation;

use super::CommandContext;

pub async fn execute(command: MilestoneCommands, ctx: &CommandContext, json: bool) -> Result<()> {
    let manager = ctx.manager();
    match command {
        MilestoneCommands::List => {
            let milestones = ctx
                .run(Operation::ListMilestones, move || manager.list_milestones())
                .await?;
            output(&MilestoneList(milestones), json);
        }
    }
    Ok(())
}
