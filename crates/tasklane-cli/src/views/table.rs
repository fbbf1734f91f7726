use chrono::{Duration, NaiveDate};
use chrono_humanize::HumanTime;
use comfy_table::{Attribute, Cell, Color, Row, Table};
use tasklane_core::models::{Task, TaskCounts, TaskPriority};

use crate::parser::today;

pub fn display_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }

    let today = today();
    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Priority", "Category", "Due Date", "Order"]);

    for task in tasks {
        let mut row = Row::new();
        row.add_cell(Cell::new(task.id));

        let mut display_title = String::new();
        if task.is_recurring {
            display_title.push('↻');
            display_title.push(' ');
        }
        display_title.push_str(&task.title);

        let mut title_cell = Cell::new(display_title);
        title_cell = if task.completed {
            title_cell
                .add_attribute(Attribute::CrossedOut)
                .fg(Color::DarkGrey)
        } else {
            match task.priority {
                TaskPriority::High => title_cell.fg(Color::Red).add_attribute(Attribute::Bold),
                TaskPriority::Medium => title_cell.fg(Color::Yellow),
                TaskPriority::Low => title_cell.fg(Color::Green),
            }
        };
        row.add_cell(title_cell);

        row.add_cell(Cell::new(task.priority));
        row.add_cell(Cell::new(&task.category));

        let due_cell = match task.due_date {
            Some(due) => {
                let cell = Cell::new(due_label(due, today));
                if task.completed {
                    cell
                } else if due < today {
                    cell.fg(Color::Red) // Overdue
                } else if due == today {
                    cell.fg(Color::Yellow)
                } else {
                    cell
                }
            }
            None => Cell::new("None"),
        };
        row.add_cell(due_cell);

        row.add_cell(Cell::new(task.order));
        table.add_row(row);
    }

    println!("{table}");
}

/// Date plus a relative hint, e.g. `2024-01-05 (in 4 days)`.
pub fn due_label(due: NaiveDate, today: NaiveDate) -> String {
    let relative = match (due - today).num_days() {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        -1 => "yesterday".to_string(),
        days => HumanTime::from(Duration::days(days)).to_string(),
    };
    format!("{} ({})", due, relative)
}

pub fn summary_line(counts: &TaskCounts) -> String {
    format!("{} active, {} completed", counts.active, counts.completed)
}
