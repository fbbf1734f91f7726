use anyhow::{anyhow, Result};
use owo_colors::{OwoColorize, Style};
use tasklane_core::error::CoreError;
use tasklane_core::models::{CreateOutcome, NewTaskData};
use tasklane_core::repository::TaskRepository;

use crate::cli::AddCommand;
use crate::config::Config;
use crate::parser::{recurrence_from_args, today};

pub async fn add_task(repo: &impl TaskRepository, command: AddCommand, config: &Config) -> Result<()> {
    let today = today();
    if let Some(due) = command.due {
        if due < today {
            return Err(anyhow!(CoreError::Validation(format!(
                "Due date {} is in the past",
                due
            ))));
        }
    }

    let category = command
        .category
        .unwrap_or_else(|| config.default_category.clone());
    if !config.is_known_category(&category) {
        eprintln!(
            "{} '{}' is not one of the configured categories ({})",
            "Warning:".yellow().bold(),
            category,
            config.categories.join(", ")
        );
    }

    let recurrence = recurrence_from_args(&command.recurrence, today);
    let task_data = NewTaskData {
        title: command.title,
        priority: Some(command.priority.unwrap_or(config.default_priority)),
        category: Some(category),
        due_date: command.due,
        is_recurring: recurrence.is_some(),
        recurring_data: recurrence,
    };

    let success_style = Style::new().green().bold();
    let info_style = Style::new().blue();

    match repo.create(task_data).await? {
        CreateOutcome::Single(task) => {
            println!(
                "{} Created task: {}",
                "✓".style(success_style),
                task.title.bright_white().bold()
            );
            println!("  {} Task ID: {}", "→".style(info_style), task.id.yellow());
            if let Some(due) = task.due_date {
                println!("  {} Due: {}", "→".style(info_style), due.cyan());
            }
        }
        CreateOutcome::Recurring(tasks) => match (tasks.first(), tasks.last()) {
            (Some(first), Some(last)) => {
                println!(
                    "{} Created {} recurring tasks: {}",
                    "✓".style(success_style),
                    tasks.len(),
                    first.title.bright_white().bold()
                );
                if let (Some(from), Some(to)) = (first.due_date, last.due_date) {
                    println!(
                        "  {} From {} to {}",
                        "→".style(info_style),
                        from.cyan(),
                        to.cyan()
                    );
                }
                println!(
                    "  {} Task IDs: {}..{}",
                    "→".style(info_style),
                    first.id.yellow(),
                    last.id.yellow()
                );
            }
            _ => {
                println!(
                    "{} The recurrence produced no dates; nothing was created.",
                    "!".yellow().bold()
                );
            }
        },
    }

    Ok(())
}
