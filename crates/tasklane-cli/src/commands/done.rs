use anyhow::Result;
use owo_colors::OwoColorize;
use tasklane_core::repository::TaskRepository;

use crate::cli::DoneCommand;

pub async fn toggle_task(repo: &impl TaskRepository, command: DoneCommand) -> Result<()> {
    let task = repo.toggle_completed(command.id).await?;

    if task.completed {
        println!("{} Completed task: '{}'", "✓".green().bold(), task.title);
    } else {
        println!("{} Reopened task: '{}'", "↺".blue().bold(), task.title);
    }

    Ok(())
}
