use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::error::CoreError;

/// Identifier assigned by the store to a persisted record.
pub type RecordId = i64;

/// Category used when the caller does not name one.
pub const DEFAULT_CATEGORY: &str = "Personal";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid task priority: {0}")]
pub struct ParseTaskPriorityError(String);

impl FromStr for TaskPriority {
    type Err = ParseTaskPriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            _ => Err(ParseTaskPriorityError(s.to_string())),
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskPriority::Low => write!(f, "low"),
            TaskPriority::Medium => write!(f, "medium"),
            TaskPriority::High => write!(f, "high"),
        }
    }
}

/// Weekday names as they appear in a recurrence's `selectedDays`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl From<chrono::Weekday> for DayOfWeek {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Sun => DayOfWeek::Sunday,
            chrono::Weekday::Mon => DayOfWeek::Monday,
            chrono::Weekday::Tue => DayOfWeek::Tuesday,
            chrono::Weekday::Wed => DayOfWeek::Wednesday,
            chrono::Weekday::Thu => DayOfWeek::Thursday,
            chrono::Weekday::Fri => DayOfWeek::Friday,
            chrono::Weekday::Sat => DayOfWeek::Saturday,
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid day of week: {0}")]
pub struct ParseDayOfWeekError(String);

impl FromStr for DayOfWeek {
    type Err = ParseDayOfWeekError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sun" | "sunday" => Ok(DayOfWeek::Sunday),
            "mon" | "monday" => Ok(DayOfWeek::Monday),
            "tue" | "tuesday" => Ok(DayOfWeek::Tuesday),
            "wed" | "wednesday" => Ok(DayOfWeek::Wednesday),
            "thu" | "thursday" => Ok(DayOfWeek::Thursday),
            "fri" | "friday" => Ok(DayOfWeek::Friday),
            "sat" | "saturday" => Ok(DayOfWeek::Saturday),
            _ => Err(ParseDayOfWeekError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RecurrencePattern {
    Daily,
    Weekly,
    Monthly,
    Custom,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid recurrence pattern: {0}")]
pub struct ParseRecurrencePatternError(String);

impl FromStr for RecurrencePattern {
    type Err = ParseRecurrencePatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(RecurrencePattern::Daily),
            "weekly" => Ok(RecurrencePattern::Weekly),
            "monthly" => Ok(RecurrencePattern::Monthly),
            "custom" => Ok(RecurrencePattern::Custom),
            _ => Err(ParseRecurrencePatternError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CustomUnit {
    Days,
    Weeks,
    Months,
    Years,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid custom unit: {0}")]
pub struct ParseCustomUnitError(String);

impl FromStr for CustomUnit {
    type Err = ParseCustomUnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" | "days" => Ok(CustomUnit::Days),
            "week" | "weeks" => Ok(CustomUnit::Weeks),
            "month" | "months" => Ok(CustomUnit::Months),
            "year" | "years" => Ok(CustomUnit::Years),
            _ => Err(ParseCustomUnitError(s.to_string())),
        }
    }
}

fn default_frequency() -> u32 {
    1
}

/// Form inputs submit an empty string for "no date".
pub(crate) fn empty_date_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// A repeating schedule: pattern, inclusive bounds and pattern parameters.
///
/// Serialized with the camelCase keys stored in a task's `recurringData`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceSpec {
    pub pattern: RecurrencePattern,
    pub start_date: NaiveDate,
    #[serde(default, deserialize_with = "empty_date_as_none")]
    pub end_date: Option<NaiveDate>,
    /// Every Nth matching cycle for daily, weekly and monthly patterns
    #[serde(default = "default_frequency")]
    pub frequency: u32,
    #[serde(default)]
    pub selected_days: Vec<DayOfWeek>,
    #[serde(default)]
    pub custom_interval: Option<u32>,
    #[serde(default)]
    pub custom_unit: Option<CustomUnit>,
}

impl RecurrenceSpec {
    fn new(pattern: RecurrencePattern, start_date: NaiveDate) -> Self {
        Self {
            pattern,
            start_date,
            end_date: None,
            frequency: 1,
            selected_days: Vec::new(),
            custom_interval: None,
            custom_unit: None,
        }
    }

    pub fn daily(start_date: NaiveDate) -> Self {
        Self::new(RecurrencePattern::Daily, start_date)
    }

    pub fn weekly(start_date: NaiveDate, days: impl IntoIterator<Item = DayOfWeek>) -> Self {
        Self {
            selected_days: days.into_iter().collect(),
            ..Self::new(RecurrencePattern::Weekly, start_date)
        }
    }

    pub fn monthly(start_date: NaiveDate) -> Self {
        Self::new(RecurrencePattern::Monthly, start_date)
    }

    pub fn custom(start_date: NaiveDate, interval: u32, unit: CustomUnit) -> Self {
        Self {
            custom_interval: Some(interval),
            custom_unit: Some(unit),
            ..Self::new(RecurrencePattern::Custom, start_date)
        }
    }

    pub fn until(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn every(mut self, frequency: u32) -> Self {
        self.frequency = frequency;
        self
    }

    /// Rejects specs missing the parameters their pattern needs.
    ///
    /// A weekly spec without selected days passes: it simply yields no dates.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.frequency == 0 {
            return Err(CoreError::Validation(
                "Recurrence frequency must be at least 1".to_string(),
            ));
        }
        if self.pattern == RecurrencePattern::Custom {
            match self.custom_interval {
                None | Some(0) => {
                    return Err(CoreError::Validation(
                        "Custom recurrence requires an interval of at least 1".to_string(),
                    ))
                }
                Some(_) => {}
            }
            if self.custom_unit.is_none() {
                return Err(CoreError::Validation(
                    "Custom recurrence requires a unit (days, weeks, months or years)".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Text form stored in the `recurringData` field.
    pub fn encode(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(text: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// A persisted to-do item. Recurring creations produce one per occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: RecordId,
    pub title: String,
    pub completed: bool,
    pub priority: TaskPriority,
    pub category: String,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub order: i64,
    pub is_recurring: bool,
    pub recurring_data: Option<RecurrenceSpec>,
    /// Reserved; generated occurrences never set it
    pub recurring_parent: Option<RecordId>,
}

#[derive(Debug, Clone, Default)]
pub struct NewTaskData {
    pub title: String,
    pub priority: Option<TaskPriority>,
    pub category: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub is_recurring: bool,
    pub recurring_data: Option<RecurrenceSpec>,
}

impl NewTaskData {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.title.trim().is_empty() {
            return Err(CoreError::Validation("Task title is required".to_string()));
        }
        if let Some(spec) = &self.recurring_data {
            spec.validate()?;
        }
        Ok(())
    }

    /// True when creation should fan out into one task per occurrence.
    pub fn wants_recurrence(&self) -> bool {
        self.is_recurring && self.recurring_data.is_some()
    }

    pub fn priority_or_default(&self) -> TaskPriority {
        self.priority.unwrap_or_default()
    }

    pub fn category_or_default(&self) -> String {
        self.category
            .clone()
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string())
    }
}

/// Partial update; only `Some` fields reach the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateTaskData {
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<TaskPriority>,
    pub category: Option<String>,
    pub due_date: Option<Option<NaiveDate>>,
    pub order: Option<i64>,
    pub is_recurring: Option<bool>,
    pub recurring_data: Option<Option<RecurrenceSpec>>,
    pub recurring_parent: Option<Option<RecordId>>,
}

impl UpdateTaskData {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(CoreError::Validation("Task title is required".to_string()));
            }
        }
        if let Some(Some(spec)) = &self.recurring_data {
            spec.validate()?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Result of `create`: one task, or every generated occurrence.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    Single(Task),
    /// An empty list means the recurrence produced no dates
    Recurring(Vec<Task>),
}

impl CreateOutcome {
    pub fn tasks(&self) -> &[Task] {
        match self {
            CreateOutcome::Single(task) => std::slice::from_ref(task),
            CreateOutcome::Recurring(tasks) => tasks,
        }
    }

    pub fn into_tasks(self) -> Vec<Task> {
        match self {
            CreateOutcome::Single(task) => vec![task],
            CreateOutcome::Recurring(tasks) => tasks,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCounts {
    pub active: usize,
    pub completed: usize,
}

impl TaskCounts {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|t| t.completed).count();
        Self {
            active: tasks.len() - completed,
            completed,
        }
    }
}
