use anyhow::Result;

use crate::cli::output::{output, CommentList};
use crate::cli::types::CommentCommands;
use crate::domain::ports::Operation;

use super::CommandContext;

pub async fn execute(command: CommentCommands, ctx: &CommandContext, json: bool) -> Result<()> {
    let manager = ctx.manager();
    match command {
        CommentCommands::List { reference } => {
            let reference = reference.as_str();
            let comments = ctx
                .run(Operation::ListComments, move || {
                    manager.list_comments(reference)
                })
                .await?;
            output(&CommentList(comments), json);
        }
        CommentCommands::Add { reference, body } => {
            let (reference, body) = (reference.as_str(), body.as_str());
            let comment = ctx
                .run(Operation::AddComment, move || {
                    manager.add_comment(reference, body)
                })
                .await?;
            output(&comment, json);
        }
    }
    Ok(())
}
