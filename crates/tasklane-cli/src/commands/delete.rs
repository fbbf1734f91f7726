use anyhow::{anyhow, Result};
use dialoguer::Confirm;
use owo_colors::OwoColorize;
use tasklane_core::error::CoreError;
use tasklane_core::repository::TaskRepository;

use crate::cli::DeleteCommand;

pub async fn delete_tasks(repo: &impl TaskRepository, command: DeleteCommand) -> Result<()> {
    if !command.force && !confirm(repo, &command.ids).await? {
        println!("Deletion cancelled.");
        return Ok(());
    }

    if let [id] = command.ids[..] {
        if !repo.delete(id).await? {
            return Err(anyhow!(CoreError::NotFound(id.to_string())));
        }
        println!("{} Deleted task {}", "✓".green().bold(), id.yellow());
        return Ok(());
    }

    let deleted = repo.bulk_delete(&command.ids).await?;
    println!(
        "{} Deleted {} of {} tasks",
        "✓".green().bold(),
        deleted.len(),
        command.ids.len()
    );

    let missed: Vec<String> = command
        .ids
        .iter()
        .filter(|id| !deleted.contains(id))
        .map(|id| id.to_string())
        .collect();
    if !missed.is_empty() {
        println!("  {} Not deleted: {}", "→".blue(), missed.join(", ").yellow());
    }

    Ok(())
}

async fn confirm(repo: &impl TaskRepository, ids: &[i64]) -> Result<bool> {
    let prompt = match ids {
        [id] => {
            let task = repo.get_by_id(*id).await?;
            format!("Are you sure you want to delete task '{}'?", task.title)
        }
        _ => format!("Are you sure you want to delete {} tasks?", ids.len()),
    };

    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .unwrap_or(false))
}
