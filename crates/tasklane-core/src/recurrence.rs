use chrono::{Datelike, Days, Months, NaiveDate};

use crate::models::{CustomUnit, DayOfWeek, RecurrencePattern, RecurrenceSpec};

/// Iteration limit when the spec has an end date.
pub const BOUNDED_ITERATION_CAP: u32 = 365;
/// Iteration limit for open-ended specs; also the most dates they can yield.
pub const UNBOUNDED_ITERATION_CAP: u32 = 30;

/// How far the cursor moves on each iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Days(u64),
    Months(u32),
}

impl Step {
    fn for_spec(spec: &RecurrenceSpec) -> Self {
        match spec.pattern {
            // weekday filtering happens in `matches`, the cursor walks every day
            RecurrencePattern::Daily | RecurrencePattern::Weekly => Step::Days(1),
            RecurrencePattern::Monthly => Step::Months(1),
            RecurrencePattern::Custom => match spec.custom_unit {
                Some(CustomUnit::Days) | None => Step::Days(1),
                Some(CustomUnit::Weeks) => Step::Days(7),
                Some(CustomUnit::Months) => Step::Months(1),
                Some(CustomUnit::Years) => Step::Months(12),
            },
        }
    }
}

/// Walks the calendar from an anchor date.
///
/// Positions are always computed as `anchor + steps * step`, so month and
/// year steps clamp to the last valid day of the target month without
/// drifting: Jan 31 visits Feb 29, Mar 31, Apr 30, May 31.
#[derive(Debug, Clone)]
struct Cursor {
    anchor: NaiveDate,
    steps: u32,
    step: Step,
    current: NaiveDate,
}

impl Cursor {
    fn new(start: NaiveDate, step: Step) -> Self {
        Self {
            anchor: start,
            steps: 0,
            step,
            current: start,
        }
    }

    /// Returns false once the calendar runs out.
    fn advance(&mut self) -> bool {
        let steps = self.steps + 1;
        let next = match self.step {
            Step::Days(n) => self.anchor.checked_add_days(Days::new(n * u64::from(steps))),
            Step::Months(n) => self.anchor.checked_add_months(Months::new(n * steps)),
        };
        match next {
            Some(date) => {
                self.steps = steps;
                self.current = date;
                true
            }
            None => false,
        }
    }

    /// Moves one extra day and re-anchors there.
    fn nudge(&mut self) -> bool {
        match self.current.succ_opt() {
            Some(date) => {
                self.anchor = date;
                self.steps = 0;
                self.current = date;
                true
            }
            None => false,
        }
    }
}

/// Enumerates the due dates described by a [`RecurrenceSpec`].
///
/// Generation is pure: the result depends only on the spec, never on the
/// current date. Malformed specs produce no dates instead of errors.
pub struct RecurrenceEngine;

impl RecurrenceEngine {
    /// Iteration cap for a spec: bounded specs may walk up to a year of
    /// steps, open-ended ones stop after 30.
    pub fn iteration_cap(spec: &RecurrenceSpec) -> u32 {
        if spec.end_date.is_some() {
            BOUNDED_ITERATION_CAP
        } else {
            UNBOUNDED_ITERATION_CAP
        }
    }

    /// Generates every due date for `spec`, in ascending order.
    ///
    /// # Behavior
    /// - The cursor starts at `start_date`; iteration `i` starts at 0
    /// - Each pass tests `matches(cursor, spec, i)`, emits on a match,
    ///   advances one step and increments `i` whether or not it matched
    /// - Stops at the iteration cap or once the cursor passes `end_date`
    /// - While nothing has been emitted yet, every pass moves the cursor one
    ///   extra day, so a start date that never matches cannot stall the walk
    pub fn generate_dates(spec: &RecurrenceSpec) -> Vec<NaiveDate> {
        let cap = Self::iteration_cap(spec);
        let mut cursor = Cursor::new(spec.start_date, Step::for_spec(spec));
        let mut dates = Vec::new();
        let mut iteration = 0;

        while iteration < cap && spec.end_date.map_or(true, |end| cursor.current <= end) {
            if Self::matches(cursor.current, spec, iteration) {
                dates.push(cursor.current);
            }

            if !cursor.advance() {
                break;
            }
            if dates.is_empty() && !cursor.nudge() {
                break;
            }

            iteration += 1;
        }

        dates
    }

    /// The first `limit` dates of [`generate_dates`](Self::generate_dates).
    pub fn preview(spec: &RecurrenceSpec, limit: usize) -> Vec<NaiveDate> {
        let mut dates = Self::generate_dates(spec);
        dates.truncate(limit);
        dates
    }

    /// Whether `date`, reached on `iteration`, is an occurrence of `spec`.
    pub fn matches(date: NaiveDate, spec: &RecurrenceSpec, iteration: u32) -> bool {
        match spec.pattern {
            RecurrencePattern::Daily => is_multiple(iteration, spec.frequency),
            RecurrencePattern::Weekly => {
                let day = DayOfWeek::from(date.weekday());
                spec.selected_days.contains(&day) && is_multiple(iteration / 7, spec.frequency)
            }
            RecurrencePattern::Monthly => {
                date.day() == spec.start_date.day() && is_multiple(iteration, spec.frequency)
            }
            RecurrencePattern::Custom => spec
                .custom_interval
                .map_or(false, |interval| is_multiple(iteration, interval)),
        }
    }
}

/// A zero divisor never matches.
fn is_multiple(value: u32, divisor: u32) -> bool {
    value.checked_rem(divisor) == Some(0)
}
