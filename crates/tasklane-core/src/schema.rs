//! Translation between [`Task`] and the store's persisted record shape.
//!
//! Store field names (`title_c`, `order_c`, ...) appear only in this module.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::CoreError;
use crate::models::{
    empty_date_as_none, NewTaskData, RecordId, RecurrenceSpec, Task, TaskPriority, UpdateTaskData,
    DEFAULT_CATEGORY,
};
use crate::store::{Record, ID_FIELD};

/// Collection holding task records.
pub const TASK_COLLECTION: &str = "task_c";

pub mod fields {
    pub const TITLE: &str = "title_c";
    pub const COMPLETED: &str = "completed_c";
    pub const PRIORITY: &str = "priority_c";
    pub const CATEGORY: &str = "category_c";
    pub const DUE_DATE: &str = "dueDate_c";
    pub const CREATED_AT: &str = "createdAt_c";
    pub const ORDER: &str = "order_c";
    pub const IS_RECURRING: &str = "isRecurring_c";
    pub const RECURRING_DATA: &str = "recurringData_c";
    pub const RECURRING_PARENT: &str = "recurringParent_c";
}

/// Every field a task read selects.
pub const TASK_FIELDS: [&str; 11] = [
    ID_FIELD,
    fields::TITLE,
    fields::COMPLETED,
    fields::PRIORITY,
    fields::CATEGORY,
    fields::DUE_DATE,
    fields::CREATED_AT,
    fields::ORDER,
    fields::IS_RECURRING,
    fields::RECURRING_DATA,
    fields::RECURRING_PARENT,
];

/// A task exactly as the store persists it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(rename = "Id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(rename = "title_c", default)]
    pub title: String,
    #[serde(rename = "completed_c", default)]
    pub completed: bool,
    #[serde(rename = "priority_c", default)]
    pub priority: TaskPriority,
    #[serde(rename = "category_c", default)]
    pub category: Option<String>,
    #[serde(rename = "dueDate_c", default, deserialize_with = "empty_date_as_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(rename = "createdAt_c", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "order_c", default)]
    pub order: i64,
    #[serde(rename = "isRecurring_c", default)]
    pub is_recurring: bool,
    /// Encoded [`RecurrenceSpec`]
    #[serde(rename = "recurringData_c", default)]
    pub recurring_data: Option<String>,
    #[serde(rename = "recurringParent_c", default)]
    pub recurring_parent: Option<RecordId>,
}

impl TaskRecord {
    /// Record for a task about to be inserted.
    pub fn for_new_task(
        data: &NewTaskData,
        due_date: Option<NaiveDate>,
        order: i64,
        is_recurring: bool,
        created_at: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            id: None,
            title: data.title.clone(),
            completed: false,
            priority: data.priority_or_default(),
            category: Some(data.category_or_default()),
            due_date,
            created_at: Some(created_at),
            order,
            is_recurring,
            recurring_data: data.recurring_data.as_ref().map(RecurrenceSpec::encode).transpose()?,
            recurring_parent: None,
        })
    }

    pub fn from_record(record: Record) -> Result<Self, CoreError> {
        Ok(serde_json::from_value(Value::Object(record))?)
    }

    pub fn into_record(self) -> Result<Record, CoreError> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(CoreError::Store(format!("Task record is not an object: {}", other))),
        }
    }

    pub fn into_task(self) -> Result<Task, CoreError> {
        let id = self
            .id
            .ok_or_else(|| CoreError::Store("Task record has no Id".to_string()))?;

        let recurring_data = match self.recurring_data.as_deref() {
            None | Some("") | Some("null") => None,
            Some(text) => match RecurrenceSpec::decode(text) {
                Ok(spec) => Some(spec),
                Err(e) => {
                    warn!(task_id = id, error = %e, "ignoring undecodable recurrence data");
                    None
                }
            },
        };

        Ok(Task {
            id,
            title: self.title,
            completed: self.completed,
            priority: self.priority,
            category: self.category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            due_date: self.due_date,
            created_at: self.created_at.unwrap_or_default(),
            order: self.order,
            is_recurring: self.is_recurring,
            recurring_data,
            recurring_parent: self.recurring_parent,
        })
    }
}

/// Decodes a store record straight into a [`Task`].
pub fn task_from_record(record: Record) -> Result<Task, CoreError> {
    TaskRecord::from_record(record)?.into_task()
}

/// Store fields for a partial update; absent fields are left out entirely.
pub fn update_record(data: &UpdateTaskData) -> Result<Record, CoreError> {
    let mut record = Record::new();

    if let Some(title) = &data.title {
        record.insert(fields::TITLE.to_string(), Value::from(title.clone()));
    }
    if let Some(completed) = data.completed {
        record.insert(fields::COMPLETED.to_string(), Value::from(completed));
    }
    if let Some(priority) = data.priority {
        record.insert(fields::PRIORITY.to_string(), Value::from(priority.to_string()));
    }
    if let Some(category) = &data.category {
        record.insert(fields::CATEGORY.to_string(), Value::from(category.clone()));
    }
    if let Some(due_date) = data.due_date {
        record.insert(fields::DUE_DATE.to_string(), serde_json::to_value(due_date)?);
    }
    if let Some(order) = data.order {
        record.insert(fields::ORDER.to_string(), Value::from(order));
    }
    if let Some(is_recurring) = data.is_recurring {
        record.insert(fields::IS_RECURRING.to_string(), Value::from(is_recurring));
    }
    if let Some(spec) = &data.recurring_data {
        let encoded = spec.as_ref().map(RecurrenceSpec::encode).transpose()?;
        record.insert(fields::RECURRING_DATA.to_string(), serde_json::to_value(encoded)?);
    }
    if let Some(parent) = data.recurring_parent {
        record.insert(fields::RECURRING_PARENT.to_string(), serde_json::to_value(parent)?);
    }

    Ok(record)
}
