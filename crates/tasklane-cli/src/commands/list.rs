use anyhow::Result;
use tasklane_core::repository::TaskRepository;

use crate::cli::ListCommand;
use crate::views::table::{display_tasks, summary_line};

pub async fn list_tasks(repo: &impl TaskRepository, command: ListCommand) -> Result<()> {
    let tasks = if let Some(category) = &command.category {
        repo.get_by_category(category).await
    } else if let Some(term) = &command.search {
        repo.search(term).await
    } else {
        repo.get_all().await
    };

    let visible: Vec<_> = tasks
        .into_iter()
        .filter(|t| command.all || t.completed == command.completed)
        .collect();

    display_tasks(&visible);
    println!("{}", summary_line(&repo.counts().await));

    Ok(())
}
