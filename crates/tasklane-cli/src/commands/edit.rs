use anyhow::{anyhow, Result};
use owo_colors::OwoColorize;
use tasklane_core::error::CoreError;
use tasklane_core::models::UpdateTaskData;
use tasklane_core::repository::TaskRepository;

use crate::cli::EditCommand;

pub async fn edit_task(repo: &impl TaskRepository, command: EditCommand) -> Result<()> {
    let due_date = if command.due_clear {
        Some(None)
    } else {
        command.due.map(Some)
    };

    let update = UpdateTaskData {
        title: command.title,
        priority: command.priority,
        category: command.category,
        due_date,
        ..Default::default()
    };

    if update.is_empty() {
        return Err(anyhow!(CoreError::Validation(
            "Nothing to change; pass at least one field to edit".to_string()
        )));
    }

    match repo.update(command.id, update).await? {
        Some(task) => {
            println!(
                "{} Updated task {}: {}",
                "✓".green().bold(),
                task.id.yellow(),
                task.title.bright_white().bold()
            );
            Ok(())
        }
        None => Err(anyhow!(CoreError::NotFound(command.id.to_string()))),
    }
}
