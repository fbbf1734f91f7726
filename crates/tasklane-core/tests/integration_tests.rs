use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashSet;
use tasklane_core::db::{establish_connection, IN_MEMORY};
use tasklane_core::error::CoreError;
use tasklane_core::models::*;
use tasklane_core::query::RecordQuery;
use tasklane_core::repository::{StoreTaskRepository, TaskRepository};
use tasklane_core::store::{Record, RecordOutcome, SqliteStore, Store};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Helper function to create a repository over a fresh in-memory database
async fn setup_repo() -> StoreTaskRepository<SqliteStore> {
    let pool = establish_connection(IN_MEMORY)
        .await
        .expect("Failed to establish test database connection");
    StoreTaskRepository::new(SqliteStore::new(pool))
}

/// Helper function to create a plain task
async fn create_test_task(repo: &impl TaskRepository, title: &str, category: &str) -> Task {
    let data = NewTaskData {
        title: title.to_string(),
        category: Some(category.to_string()),
        ..Default::default()
    };
    match repo.create(data).await.expect("Failed to create test task") {
        CreateOutcome::Single(task) => task,
        other => panic!("Expected a single task, got {:?}", other),
    }
}

fn recurring(title: &str, spec: RecurrenceSpec) -> NewTaskData {
    NewTaskData {
        title: title.to_string(),
        priority: Some(TaskPriority::High),
        category: Some("Work".to_string()),
        is_recurring: true,
        recurring_data: Some(spec),
        ..Default::default()
    }
}

/// A store whose backend is unreachable
struct FailingStore;

#[async_trait]
impl Store for FailingStore {
    async fn fetch(&self, _: &str, _: &RecordQuery) -> Result<Vec<Record>, CoreError> {
        Err(CoreError::Store("backend unavailable".to_string()))
    }

    async fn get_by_id(&self, _: &str, _: i64) -> Result<Option<Record>, CoreError> {
        Err(CoreError::Store("backend unavailable".to_string()))
    }

    async fn insert_many(&self, _: &str, _: Vec<Record>) -> Result<Vec<RecordOutcome>, CoreError> {
        Err(CoreError::Store("backend unavailable".to_string()))
    }

    async fn update_many(&self, _: &str, _: Vec<(i64, Record)>) -> Result<Vec<RecordOutcome>, CoreError> {
        Err(CoreError::Store("backend unavailable".to_string()))
    }

    async fn delete_many(&self, _: &str, _: &[i64]) -> Result<Vec<RecordOutcome>, CoreError> {
        Err(CoreError::Store("backend unavailable".to_string()))
    }
}

/// Rejects alternating records of each insert and forwards everything else
struct FlakyStore {
    inner: SqliteStore,
    reject_first: bool,
}

impl FlakyStore {
    async fn new(reject_first: bool) -> Self {
        let pool = establish_connection(IN_MEMORY).await.unwrap();
        Self {
            inner: SqliteStore::new(pool),
            reject_first,
        }
    }

    fn accepts(&self, index: usize) -> bool {
        (index % 2 == 0) != self.reject_first
    }
}

#[async_trait]
impl Store for FlakyStore {
    async fn fetch(&self, collection: &str, query: &RecordQuery) -> Result<Vec<Record>, CoreError> {
        self.inner.fetch(collection, query).await
    }

    async fn get_by_id(&self, collection: &str, id: i64) -> Result<Option<Record>, CoreError> {
        self.inner.get_by_id(collection, id).await
    }

    async fn insert_many(&self, collection: &str, records: Vec<Record>) -> Result<Vec<RecordOutcome>, CoreError> {
        let total = records.len();
        let accepted: Vec<Record> = records
            .into_iter()
            .enumerate()
            .filter(|(i, _)| self.accepts(*i))
            .map(|(_, record)| record)
            .collect();
        let mut stored = self.inner.insert_many(collection, accepted).await?.into_iter();

        Ok((0..total)
            .map(|i| {
                if self.accepts(i) {
                    stored.next().expect("one outcome per accepted record")
                } else {
                    RecordOutcome::failed(None, "quota exceeded")
                }
            })
            .collect())
    }

    async fn update_many(&self, collection: &str, records: Vec<(i64, Record)>) -> Result<Vec<RecordOutcome>, CoreError> {
        self.inner.update_many(collection, records).await
    }

    async fn delete_many(&self, collection: &str, ids: &[i64]) -> Result<Vec<RecordOutcome>, CoreError> {
        self.inner.delete_many(collection, ids).await
    }
}

#[tokio::test]
async fn test_basic_task_crud_workflow() {
    let repo = setup_repo().await;

    let task = create_test_task(&repo, "Buy groceries", "Shopping").await;
    assert_eq!(task.title, "Buy groceries");
    assert_eq!(task.category, "Shopping");
    assert_eq!(task.priority, TaskPriority::Medium);
    assert!(!task.completed);
    assert!(!task.is_recurring);
    assert_eq!(task.recurring_parent, None);

    let updated = repo
        .update(
            task.id,
            UpdateTaskData {
                title: Some("Buy groceries and milk".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to update task")
        .expect("Update should report the task");
    assert_eq!(updated.title, "Buy groceries and milk");
    // untouched fields survive a partial update
    assert_eq!(updated.category, "Shopping");
    assert_eq!(updated.order, task.order);

    assert!(repo.delete(task.id).await.unwrap());
    assert!(!repo.delete(task.id).await.unwrap());
    assert!(matches!(repo.get_by_id(task.id).await, Err(CoreError::NotFound(_))));
}

#[tokio::test]
async fn test_non_recurring_create_takes_next_order() {
    let repo = setup_repo().await;

    let first = create_test_task(&repo, "first", "Personal").await;
    assert_eq!(first.order, 1);

    let second = create_test_task(&repo, "second", "Personal").await;
    assert_eq!(second.order, first.order + 1);

    assert!(repo.reorder(first.id, 10).await);
    let third = create_test_task(&repo, "third", "Personal").await;
    assert_eq!(third.order, 11);
}

#[tokio::test]
async fn test_create_after_order_space_is_exhausted() {
    let repo = setup_repo().await;
    let last = create_test_task(&repo, "last", "Personal").await;
    assert!(repo.reorder(last.id, i64::MAX).await);

    let plain = NewTaskData {
        title: "one more".to_string(),
        ..Default::default()
    };
    assert!(matches!(repo.create(plain).await, Err(CoreError::Validation(_))));

    let series = recurring("series", RecurrenceSpec::daily(date(2024, 1, 1)).until(date(2024, 1, 3)));
    assert!(matches!(repo.create(series).await, Err(CoreError::Validation(_))));

    assert_eq!(repo.get_all().await.len(), 1);

    // freeing the top of the range makes room again
    assert!(repo.reorder(last.id, 5).await);
    assert_eq!(create_test_task(&repo, "fits", "Personal").await.order, 6);
}

#[tokio::test]
async fn test_recurring_create_generates_one_task_per_date() {
    let repo = setup_repo().await;
    let existing = create_test_task(&repo, "existing", "Personal").await;

    let spec = RecurrenceSpec::weekly(date(2024, 1, 1), [DayOfWeek::Monday, DayOfWeek::Wednesday])
        .until(date(2024, 1, 15));
    let outcome = repo.create(recurring("Gym", spec.clone())).await.unwrap();

    let tasks = match outcome {
        CreateOutcome::Recurring(tasks) => tasks,
        other => panic!("Expected recurring outcome, got {:?}", other),
    };

    let due: Vec<Option<NaiveDate>> = tasks.iter().map(|t| t.due_date).collect();
    assert_eq!(
        due,
        vec![
            Some(date(2024, 1, 1)),
            Some(date(2024, 1, 3)),
            Some(date(2024, 1, 8)),
            Some(date(2024, 1, 10)),
            Some(date(2024, 1, 15)),
        ]
    );

    let orders: Vec<i64> = tasks.iter().map(|t| t.order).collect();
    let expected: Vec<i64> = (existing.order + 1..=existing.order + 5).collect();
    assert_eq!(orders, expected);

    for task in &tasks {
        assert_eq!(task.title, "Gym");
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.category, "Work");
        assert!(task.is_recurring);
        assert!(!task.completed);
        assert_eq!(task.recurring_data.as_ref(), Some(&spec));
        assert_eq!(task.recurring_parent, None);
    }

    // the persisted copies decode to the same spec
    let stored = repo.get_all().await;
    assert_eq!(stored.len(), 6);
    assert!(stored
        .iter()
        .filter(|t| t.is_recurring)
        .all(|t| t.recurring_data.as_ref() == Some(&spec)));
}

#[tokio::test]
async fn test_recurrence_without_dates_creates_nothing() {
    let repo = setup_repo().await;

    let spec = RecurrenceSpec::weekly(date(2024, 1, 1), []).until(date(2024, 3, 1));
    let outcome = repo.create(recurring("Never", spec)).await.unwrap();

    assert_eq!(outcome, CreateOutcome::Recurring(Vec::new()));
    assert!(repo.get_all().await.is_empty());
}

#[tokio::test]
async fn test_recurring_flag_without_spec_creates_single_task() {
    let repo = setup_repo().await;

    let data = NewTaskData {
        title: "Flagged".to_string(),
        is_recurring: true,
        due_date: Some(date(2024, 6, 1)),
        ..Default::default()
    };
    match repo.create(data).await.unwrap() {
        CreateOutcome::Single(task) => {
            assert!(task.is_recurring);
            assert_eq!(task.due_date, Some(date(2024, 6, 1)));
            assert_eq!(task.recurring_data, None);
        }
        other => panic!("Expected a single task, got {:?}", other),
    }
}

#[tokio::test]
async fn test_create_validation() {
    let repo = setup_repo().await;

    let blank = NewTaskData {
        title: "  ".to_string(),
        ..Default::default()
    };
    assert!(matches!(repo.create(blank).await, Err(CoreError::Validation(_))));

    let mut spec = RecurrenceSpec::custom(date(2024, 1, 1), 2, CustomUnit::Days);
    spec.custom_unit = None;
    assert!(matches!(
        repo.create(recurring("Broken", spec)).await,
        Err(CoreError::Validation(_))
    ));

    let update = UpdateTaskData {
        title: Some(String::new()),
        ..Default::default()
    };
    assert!(matches!(repo.update(1, update).await, Err(CoreError::Validation(_))));

    assert!(repo.get_all().await.is_empty());
}

#[tokio::test]
async fn test_update_missing_task_returns_none() {
    let repo = setup_repo().await;

    let result = repo
        .update(
            404,
            UpdateTaskData {
                completed: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(result.is_none());
    assert!(!repo.reorder(404, 3).await);
}

#[tokio::test]
async fn test_update_clears_due_date() {
    let repo = setup_repo().await;
    let data = NewTaskData {
        title: "Dentist".to_string(),
        due_date: Some(date(2024, 9, 1)),
        ..Default::default()
    };
    let task = repo.create(data).await.unwrap().into_tasks().remove(0);

    let updated = repo
        .update(
            task.id,
            UpdateTaskData {
                due_date: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.due_date, None);
    assert_eq!(updated.title, "Dentist");
}

#[tokio::test]
async fn test_bulk_delete_returns_only_removed_ids() {
    let repo = setup_repo().await;
    let a = create_test_task(&repo, "a", "Personal").await;
    let b = create_test_task(&repo, "b", "Personal").await;
    let c = create_test_task(&repo, "c", "Personal").await;

    let deleted = repo.bulk_delete(&[a.id, 9_999, c.id]).await.unwrap();
    assert_eq!(deleted, vec![a.id, c.id]);

    let remaining: Vec<i64> = repo.get_all().await.iter().map(|t| t.id).collect();
    assert_eq!(remaining, vec![b.id]);

    assert!(repo.bulk_delete(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_read_paths_filter_and_sort() {
    let repo = setup_repo().await;
    let milk = create_test_task(&repo, "Buy milk", "Shopping").await;
    let report = create_test_task(&repo, "Quarterly report", "Work").await;
    let walk = create_test_task(&repo, "Walk the dog", "Personal").await;

    // move the first task to the end
    assert!(repo.reorder(milk.id, 100).await);

    let all: Vec<i64> = repo.get_all().await.iter().map(|t| t.id).collect();
    assert_eq!(all, vec![report.id, walk.id, milk.id]);

    let work: Vec<i64> = repo.get_by_category("Work").await.iter().map(|t| t.id).collect();
    assert_eq!(work, vec![report.id]);
    assert!(repo.get_by_category("work").await.is_empty());

    let by_title: Vec<i64> = repo.search("MILK").await.iter().map(|t| t.id).collect();
    assert_eq!(by_title, vec![milk.id]);

    let by_category: Vec<i64> = repo.search("person").await.iter().map(|t| t.id).collect();
    assert_eq!(by_category, vec![walk.id]);

    assert!(repo.search("nothing matches").await.is_empty());
}

#[tokio::test]
async fn test_search_folds_non_ascii_case() {
    let repo = setup_repo().await;
    let trip = create_test_task(&repo, "École trip", "Personal").await;
    let errand = create_test_task(&repo, "Groceries", "Ärzte").await;
    create_test_task(&repo, "Plain", "Work").await;

    for term in ["école", "ÉCOLE", "  École Trip  "] {
        let ids: Vec<i64> = repo.search(term).await.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![trip.id], "searching {:?}", term);
    }

    let by_category: Vec<i64> = repo.search("ärz").await.iter().map(|t| t.id).collect();
    assert_eq!(by_category, vec![errand.id]);

    let renamed = UpdateTaskData {
        title: Some("ÜBER école".to_string()),
        ..Default::default()
    };
    repo.update(errand.id, renamed).await.unwrap();
    let ids: HashSet<i64> = repo.search("über").await.iter().map(|t| t.id).collect();
    assert_eq!(ids, HashSet::from([errand.id]));
    assert_eq!(repo.search("École").await.len(), 2);
}

#[tokio::test]
async fn test_empty_search_matches_get_all() {
    let repo = setup_repo().await;
    create_test_task(&repo, "one", "Work").await;
    create_test_task(&repo, "two", "Personal").await;
    repo.create(recurring(
        "three",
        RecurrenceSpec::daily(date(2024, 1, 1)).until(date(2024, 1, 3)),
    ))
    .await
    .unwrap();

    let all = repo.get_all().await;
    assert_eq!(all.len(), 5);
    assert_eq!(repo.search("").await, all);
    assert_eq!(repo.search("   ").await, all);
}

#[tokio::test]
async fn test_toggle_completed_and_counts() {
    let repo = setup_repo().await;
    let task = create_test_task(&repo, "Laundry", "Personal").await;
    create_test_task(&repo, "Dishes", "Personal").await;

    let done = repo.toggle_completed(task.id).await.unwrap();
    assert!(done.completed);
    assert_eq!(repo.counts().await, TaskCounts { active: 1, completed: 1 });

    let undone = repo.toggle_completed(task.id).await.unwrap();
    assert!(!undone.completed);
    assert_eq!(repo.counts().await, TaskCounts { active: 2, completed: 0 });

    assert!(matches!(
        repo.toggle_completed(12_345).await,
        Err(CoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_reads_swallow_store_failures() {
    let repo = StoreTaskRepository::new(FailingStore);

    assert!(repo.get_all().await.is_empty());
    assert!(repo.get_by_category("Work").await.is_empty());
    assert!(repo.search("milk").await.is_empty());
    assert!(repo.search("").await.is_empty());
    assert_eq!(repo.counts().await, TaskCounts::default());
    assert!(!repo.reorder(1, 2).await);
}

#[tokio::test]
async fn test_writes_surface_store_failures() {
    let repo = StoreTaskRepository::new(FailingStore);

    let data = NewTaskData {
        title: "Unreachable".to_string(),
        ..Default::default()
    };
    assert!(matches!(repo.create(data).await, Err(CoreError::Store(_))));
    assert!(matches!(
        repo.update(1, UpdateTaskData { completed: Some(true), ..Default::default() }).await,
        Err(CoreError::Store(_))
    ));
    assert!(matches!(repo.delete(1).await, Err(CoreError::Store(_))));
    assert!(matches!(repo.bulk_delete(&[1, 2]).await, Err(CoreError::Store(_))));
    assert!(matches!(repo.get_by_id(1).await, Err(CoreError::Store(_))));
}

#[tokio::test]
async fn test_partial_recurring_insert_returns_successful_subset() {
    let repo = StoreTaskRepository::new(FlakyStore::new(false).await);

    let spec = RecurrenceSpec::daily(date(2024, 1, 1)).until(date(2024, 1, 5));
    let tasks = repo.create(recurring("Flaky", spec)).await.unwrap().into_tasks();

    let due: Vec<Option<NaiveDate>> = tasks.iter().map(|t| t.due_date).collect();
    assert_eq!(
        due,
        vec![Some(date(2024, 1, 1)), Some(date(2024, 1, 3)), Some(date(2024, 1, 5))]
    );
    let orders: Vec<i64> = tasks.iter().map(|t| t.order).collect();
    assert_eq!(orders, vec![1, 3, 5]);
}

#[tokio::test]
async fn test_single_insert_rejected_by_store_is_an_error() {
    let repo = StoreTaskRepository::new(FlakyStore::new(true).await);

    let data = NewTaskData {
        title: "Rejected".to_string(),
        ..Default::default()
    };
    match repo.create(data).await {
        Err(CoreError::Store(message)) => assert_eq!(message, "quota exceeded"),
        other => panic!("Expected a store error, got {:?}", other),
    }
    assert!(repo.get_all().await.is_empty());
}

#[tokio::test]
async fn test_concurrent_recurring_creates_get_distinct_orders() {
    let repo = setup_repo().await;

    let first = recurring("A", RecurrenceSpec::daily(date(2024, 1, 1)).until(date(2024, 1, 10)));
    let second = recurring("B", RecurrenceSpec::daily(date(2024, 2, 1)).until(date(2024, 2, 10)));
    let (a, b) = tokio::join!(repo.create(first), repo.create(second));

    let mut orders: Vec<i64> = a
        .unwrap()
        .into_tasks()
        .into_iter()
        .chain(b.unwrap().into_tasks())
        .map(|t| t.order)
        .collect();
    assert_eq!(orders.len(), 20);

    let unique: HashSet<i64> = orders.iter().copied().collect();
    assert_eq!(unique.len(), 20);

    orders.sort_unstable();
    assert_eq!(orders, (1..=20).collect::<Vec<i64>>());
}

#[tokio::test]
async fn test_file_database_persists_between_connections() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("nested").join("tasks.db");
    let db_path = db_path.to_string_lossy().to_string();

    {
        let pool = establish_connection(&db_path).await.unwrap();
        let repo = StoreTaskRepository::new(SqliteStore::new(pool.clone()));
        create_test_task(&repo, "Persisted", "Work").await;
        pool.close().await;
    }

    let pool = establish_connection(&db_path).await.unwrap();
    let repo = StoreTaskRepository::new(SqliteStore::new(pool));
    let tasks = repo.get_all().await;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Persisted");
}
