use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tasklane_core::models::{CustomUnit, DayOfWeek, RecurrencePattern, TaskPriority};

use crate::parser::parse_date;

/// A to-do list with recurring task generation
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Add a new task, or a run of recurring tasks
    Add(AddCommand),
    /// List tasks
    List(ListCommand),
    /// Edit a task
    Edit(EditCommand),
    /// Toggle a task between active and completed
    Done(DoneCommand),
    /// Delete one or more tasks
    Delete(DeleteCommand),
    /// Move a task to a new position
    Reorder(ReorderCommand),
    /// Show the dates a recurrence would produce without saving anything
    Preview(PreviewCommand),
}

/// Recurrence flags shared by `add` and `preview`.
#[derive(Args, Debug, Clone, Default)]
pub struct RecurrenceArgs {
    /// Repeat the task (daily, weekly, monthly, custom)
    #[arg(long)]
    pub every: Option<RecurrencePattern>,
    /// First date of the recurrence (defaults to today)
    #[arg(long, value_parser = parse_date, requires = "every")]
    pub start: Option<NaiveDate>,
    /// Last date of the recurrence (inclusive)
    #[arg(long, value_parser = parse_date, requires = "every")]
    pub until: Option<NaiveDate>,
    /// Repeat every N periods
    #[arg(long, requires = "every")]
    pub frequency: Option<u32>,
    /// Days of the week for weekly recurrence (e.g. mon,wed)
    #[arg(long, value_delimiter = ',', requires = "every")]
    pub on: Vec<DayOfWeek>,
    /// Interval for custom recurrence
    #[arg(long, requires = "every")]
    pub interval: Option<u32>,
    /// Unit for custom recurrence (days, weeks, months, years)
    #[arg(long, requires = "every")]
    pub unit: Option<CustomUnit>,
}

#[derive(Parser, Debug, Clone)]
pub struct AddCommand {
    /// The title of the task
    pub title: String,
    /// The priority of the task (low, medium, high)
    #[arg(short, long)]
    pub priority: Option<TaskPriority>,
    /// The category of the task
    #[arg(short, long)]
    pub category: Option<String>,
    /// The due date of the task (YYYY-MM-DD, today, tomorrow)
    #[arg(short, long, value_parser = parse_date, conflicts_with = "every")]
    pub due: Option<NaiveDate>,
    #[command(flatten)]
    pub recurrence: RecurrenceArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct ListCommand {
    /// Only show tasks in this category
    #[arg(long, conflicts_with = "search")]
    pub category: Option<String>,
    /// Only show tasks whose title or category contains this text
    #[arg(short, long)]
    pub search: Option<String>,
    /// Only show completed tasks
    #[arg(long, conflicts_with = "all")]
    pub completed: bool,
    /// Show active and completed tasks
    #[arg(short, long)]
    pub all: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct EditCommand {
    /// The ID of the task to edit
    pub id: i64,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub priority: Option<TaskPriority>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long, value_parser = parse_date)]
    pub due: Option<NaiveDate>,
    #[arg(long, conflicts_with = "due")]
    pub due_clear: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct DoneCommand {
    /// The ID of the task to toggle
    pub id: i64,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteCommand {
    /// IDs of the tasks to delete
    #[arg(required = true, num_args = 1..)]
    pub ids: Vec<i64>,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ReorderCommand {
    /// The ID of the task to move
    pub id: i64,
    /// The new order value
    #[arg(allow_negative_numbers = true)]
    pub order: i64,
}

#[derive(Parser, Debug, Clone)]
pub struct PreviewCommand {
    #[command(flatten)]
    pub recurrence: RecurrenceArgs,
    /// Maximum number of dates to print
    #[arg(short, long, default_value_t = 10)]
    pub limit: usize,
}
