use crate::error::CoreError;
use crate::models::{
    CreateOutcome, NewTaskData, RecordId, RecurrenceSpec, Task, TaskCounts, UpdateTaskData,
};
use crate::query::{Condition, Direction, RecordQuery};
use crate::recurrence::RecurrenceEngine;
use crate::repository::{StoreTaskRepository, TaskRepository};
use crate::schema::{fields, task_from_record, update_record, TaskRecord, TASK_COLLECTION, TASK_FIELDS};
use crate::store::{partition_outcomes, Record, RecordOutcome, Store, ID_FIELD};
use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, error, warn};

#[async_trait]
impl<S: Store> TaskRepository for StoreTaskRepository<S> {
    async fn create(&self, data: NewTaskData) -> Result<CreateOutcome, CoreError> {
        data.validate()?;

        if let (true, Some(spec)) = (data.wants_recurrence(), &data.recurring_data) {
            let tasks = self.create_recurring(&data, spec).await?;
            return Ok(CreateOutcome::Recurring(tasks));
        }

        let order = self.orders().reserve(self.store(), 1).await?;
        let record = TaskRecord::for_new_task(&data, data.due_date, order, data.is_recurring, Utc::now())?
            .into_record()?;

        let outcomes = self
            .store()
            .insert_many(TASK_COLLECTION, vec![record.clone()])
            .await?;
        let (succeeded, failed) = partition_outcomes(outcomes);
        log_failures("create", &failed);

        match succeeded.into_iter().next() {
            Some(outcome) => Ok(CreateOutcome::Single(task_from_outcome(outcome, record)?)),
            None => Err(CoreError::Store(
                failed
                    .into_iter()
                    .find_map(|o| o.error)
                    .unwrap_or_else(|| "Store did not report a created task".to_string()),
            )),
        }
    }

    async fn update(&self, id: RecordId, data: UpdateTaskData) -> Result<Option<Task>, CoreError> {
        data.validate()?;

        let changes = update_record(&data)?;
        let outcomes = self
            .store()
            .update_many(TASK_COLLECTION, vec![(id, changes)])
            .await?;
        let (succeeded, failed) = partition_outcomes(outcomes);
        log_failures("update", &failed);

        let Some(outcome) = succeeded.into_iter().next() else {
            return Ok(None);
        };

        match outcome.data {
            Some(record) => Ok(Some(task_from_record(record)?)),
            None => self
                .store()
                .get_by_id(TASK_COLLECTION, id)
                .await?
                .map(task_from_record)
                .transpose(),
        }
    }

    async fn delete(&self, id: RecordId) -> Result<bool, CoreError> {
        let deleted = self.bulk_delete(&[id]).await?;
        Ok(deleted.contains(&id))
    }

    async fn bulk_delete(&self, ids: &[RecordId]) -> Result<Vec<RecordId>, CoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let outcomes = self.store().delete_many(TASK_COLLECTION, ids).await?;
        let (succeeded, failed) = partition_outcomes(outcomes);
        log_failures("delete", &failed);

        Ok(succeeded.into_iter().filter_map(|o| o.id).collect())
    }

    async fn get_all(&self) -> Vec<Task> {
        self.fetch_tasks(task_query(None), "fetching tasks").await
    }

    async fn get_by_id(&self, id: RecordId) -> Result<Task, CoreError> {
        match self.store().get_by_id(TASK_COLLECTION, id).await? {
            Some(record) => task_from_record(record),
            None => Err(CoreError::NotFound(id.to_string())),
        }
    }

    async fn get_by_category(&self, name: &str) -> Vec<Task> {
        let filter = Condition::equal_to(fields::CATEGORY, name);
        self.fetch_tasks(task_query(Some(filter)), "fetching tasks by category")
            .await
    }

    async fn search(&self, term: &str) -> Vec<Task> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return self.get_all().await;
        }

        let filter = Condition::any(vec![
            Condition::contains(fields::TITLE, term.as_str()),
            Condition::contains(fields::CATEGORY, term.as_str()),
        ]);
        self.fetch_tasks(task_query(Some(filter)), "searching tasks").await
    }

    async fn reorder(&self, id: RecordId, new_order: i64) -> bool {
        let data = UpdateTaskData {
            order: Some(new_order),
            ..Default::default()
        };
        match self.update(id, data).await {
            Ok(updated) => updated.is_some(),
            Err(e) => {
                warn!(task_id = id, error = %e, "reorder failed");
                false
            }
        }
    }

    async fn toggle_completed(&self, id: RecordId) -> Result<Task, CoreError> {
        let task = self.get_by_id(id).await?;
        let data = UpdateTaskData {
            completed: Some(!task.completed),
            ..Default::default()
        };
        self.update(id, data)
            .await?
            .ok_or_else(|| CoreError::NotFound(id.to_string()))
    }

    async fn counts(&self) -> TaskCounts {
        TaskCounts::from_tasks(&self.get_all().await)
    }
}

impl<S: Store> StoreTaskRepository<S> {
    /// Inserts one task per generated date in a single bulk request.
    async fn create_recurring(&self, data: &NewTaskData, spec: &RecurrenceSpec) -> Result<Vec<Task>, CoreError> {
        let dates = RecurrenceEngine::generate_dates(spec);
        if dates.is_empty() {
            debug!(pattern = ?spec.pattern, "recurrence produced no dates");
            return Ok(Vec::new());
        }

        let first_order = self.orders().reserve(self.store(), dates.len()).await?;
        let created_at = Utc::now();

        let records = dates
            .iter()
            .enumerate()
            .map(|(i, date)| {
                TaskRecord::for_new_task(data, Some(*date), first_order + i as i64, true, created_at)
                    .and_then(TaskRecord::into_record)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let outcomes = self
            .store()
            .insert_many(TASK_COLLECTION, records.clone())
            .await?;

        let mut tasks = Vec::with_capacity(outcomes.len());
        let mut failed = Vec::new();
        for (outcome, sent) in outcomes.into_iter().zip(records) {
            if !outcome.success {
                failed.push(outcome);
                continue;
            }
            match task_from_outcome(outcome, sent) {
                Ok(task) => tasks.push(task),
                Err(e) => warn!(error = %e, "created task could not be decoded"),
            }
        }
        log_failures("create recurring", &failed);

        debug!(requested = dates.len(), created = tasks.len(), "created recurring tasks");
        Ok(tasks)
    }

    async fn fetch_tasks(&self, query: RecordQuery, context: &str) -> Vec<Task> {
        let records = match self.store().fetch(TASK_COLLECTION, &query).await {
            Ok(records) => records,
            Err(e) => {
                error!(error = %e, "Error {}", context);
                return Vec::new();
            }
        };

        let mut tasks: Vec<Task> = records
            .into_iter()
            .filter_map(|record| match task_from_record(record) {
                Ok(task) => Some(task),
                Err(e) => {
                    warn!(error = %e, "skipping malformed task record");
                    None
                }
            })
            .collect();

        // stable, so the store's tie-break order survives
        tasks.sort_by_key(|task| task.order);
        tasks
    }
}

fn task_query(filter: Option<Condition>) -> RecordQuery {
    let query = RecordQuery::new()
        .select(TASK_FIELDS)
        .order_by(fields::ORDER, Direction::Asc);
    match filter {
        Some(condition) => query.filter(condition),
        None => query,
    }
}

/// Prefers the store's echo of the record, falling back to what was sent.
fn task_from_outcome(outcome: RecordOutcome, sent: Record) -> Result<Task, CoreError> {
    let mut record = outcome.data.unwrap_or(sent);
    if !record.contains_key(ID_FIELD) {
        if let Some(id) = outcome.id {
            record.insert(ID_FIELD.to_string(), id.into());
        }
    }
    task_from_record(record)
}

fn log_failures(operation: &str, failed: &[RecordOutcome]) {
    if failed.is_empty() {
        return;
    }
    let details: Vec<String> = failed
        .iter()
        .map(|o| match (o.id, o.error.as_deref()) {
            (Some(id), Some(err)) => format!("{}: {}", id, err),
            (None, Some(err)) => err.to_string(),
            (Some(id), None) => id.to_string(),
            (None, None) => "unknown".to_string(),
        })
        .collect();
    warn!(
        operation,
        failed = failed.len(),
        details = %details.join("; "),
        "store reported failed records"
    );
}
