use anyhow::{anyhow, Result};
use owo_colors::OwoColorize;
use tasklane_core::error::CoreError;
use tasklane_core::recurrence::RecurrenceEngine;

use crate::cli::PreviewCommand;
use crate::parser::{recurrence_from_args, today};

pub fn preview_recurrence(command: PreviewCommand) -> Result<()> {
    let spec = recurrence_from_args(&command.recurrence, today()).ok_or_else(|| {
        anyhow!(CoreError::Validation(
            "--every is required to preview a recurrence".to_string()
        ))
    })?;
    spec.validate()?;

    let total = RecurrenceEngine::generate_dates(&spec).len();
    if total == 0 {
        println!("The recurrence produces no dates.");
        return Ok(());
    }

    for date in RecurrenceEngine::preview(&spec, command.limit) {
        println!("  {}  {}", date.cyan(), date.format("%a").dimmed());
    }

    let shown = total.min(command.limit);
    if shown < total {
        println!("Showing {} of {} dates", shown, total);
    } else {
        println!("{} dates", total);
    }
    Ok(())
}
