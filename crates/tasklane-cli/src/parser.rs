use chrono::{Local, NaiveDate};
use tasklane_core::models::RecurrenceSpec;
use thiserror::Error;

use crate::cli::RecurrenceArgs;

#[derive(Error, Debug, PartialEq)]
#[error("Invalid date '{0}': expected YYYY-MM-DD, 'today' or 'tomorrow'")]
pub struct DateParseError(String);

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parses a calendar date relative to the local day.
pub fn parse_date(input: &str) -> Result<NaiveDate, DateParseError> {
    parse_date_from(input, today())
}

pub fn parse_date_from(input: &str, today: NaiveDate) -> Result<NaiveDate, DateParseError> {
    let trimmed = input.trim();
    match trimmed.to_lowercase().as_str() {
        "today" => Ok(today),
        "tomorrow" => today
            .succ_opt()
            .ok_or_else(|| DateParseError(input.to_string())),
        _ => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map_err(|_| DateParseError(input.to_string())),
    }
}

/// Builds the recurrence described by the flags, or `None` when `--every` is absent.
///
/// Parameters are passed through as given; the core validates them.
pub fn recurrence_from_args(args: &RecurrenceArgs, today: NaiveDate) -> Option<RecurrenceSpec> {
    let pattern = args.every?;

    Some(RecurrenceSpec {
        pattern,
        start_date: args.start.unwrap_or(today),
        end_date: args.until,
        frequency: args.frequency.unwrap_or(1),
        selected_days: args.on.clone(),
        custom_interval: args.interval,
        custom_unit: args.unit,
    })
}
