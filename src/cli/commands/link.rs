use anyhow::Result;

use crate::cli::output::{output, Done};
use crate::cli::types::LinkCommands;
use crate::domain::ports::Operation;

use super::CommandContext;

pub async fn execute(command: LinkCommands, ctx: &CommandContext, json: bool) -> Result<()> {
    let manager = ctx.manager();
    let message = match command {
        LinkCommands::Branch { reference, branch } => {
            let (r, b) = (reference.as_str(), branch.as_str());
            ctx.run(Operation::AddBranch, move || manager.add_branch(r, b)).await?;
            format!("Linked branch '{branch}' to {reference}")
        }
        LinkCommands::Pr {
            reference,
            pull_request,
        } => {
            let (r, pr) = (reference.as_str(), pull_request.as_str());
            ctx.run(Operation::AddPullRequest, move || {
                manager.add_pull_request(r, pr)
            })
            .await?;
            format!("Linked pull request {pull_request} to {reference}")
        }
        LinkCommands::Subtask { parent, child } => {
            let (p, c) = (parent.as_str(), child.as_str());
            ctx.run(Operation::AddSubtask, move || manager.add_subtask(p, c)).await?;
            format!("{child} is now a subtask of {parent}")
        }
        LinkCommands::Parent { child, parent } => {
            let (c, p) = (child.as_str(), parent.as_str());
            ctx.run(Operation::AddParent, move || manager.add_parent(c, p)).await?;
            format!("{parent} is now the parent of {child}")
        }
        LinkCommands::BlockedBy { reference, blocker } => {
            let (r, b) = (reference.as_str(), blocker.as_str());
            ctx.run(Operation::AddBlockedBy, move || manager.add_blocked_by(r, b)).await?;
            format!("{reference} is now blocked by {blocker}")
        }
        LinkCommands::Blocking { reference, blocked } => {
            let (r, b) = (reference.as_str(), blocked.as_str());
            ctx.run(Operation::AddBlocking, move || manager.add_blocking(r, b)).await?;
            format!("{reference} now blocks {blocked}")
        }
    };
    output(&Done::new(message), json);
    Ok(())
}
