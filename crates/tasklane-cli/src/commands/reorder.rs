use anyhow::{bail, Result};
use owo_colors::OwoColorize;
use tasklane_core::repository::TaskRepository;

use crate::cli::ReorderCommand;

pub async fn reorder_task(repo: &impl TaskRepository, command: ReorderCommand) -> Result<()> {
    if !repo.reorder(command.id, command.order).await {
        bail!("Task {} could not be moved", command.id);
    }

    println!(
        "{} Moved task {} to position {}",
        "✓".green().bold(),
        command.id.yellow(),
        command.order
    );
    Ok(())
}
