use crate::error::CoreError;
use crate::models::{CreateOutcome, NewTaskData, RecordId, Task, TaskCounts, UpdateTaskData};
use crate::store::Store;
use async_trait::async_trait;

pub mod ordering;
pub mod tasks;

pub use ordering::OrderAllocator;

/// Task persistence operations.
///
/// Writes return errors to the caller. Reads never fail: a store failure is
/// logged and reported as an empty result. Bulk writes that partly fail
/// return only the successful subset.
#[async_trait]
pub trait TaskRepository {
    /// Creates one task, or one task per recurrence date when the input is
    /// recurring. A recurrence that yields no dates creates nothing.
    async fn create(&self, data: NewTaskData) -> Result<CreateOutcome, CoreError>;
    /// Sends only the fields present in `data`. `Ok(None)` when the store
    /// reported no successful update for `id`.
    async fn update(&self, id: RecordId, data: UpdateTaskData) -> Result<Option<Task>, CoreError>;
    async fn delete(&self, id: RecordId) -> Result<bool, CoreError>;
    /// Returns the ids that were actually removed.
    async fn bulk_delete(&self, ids: &[RecordId]) -> Result<Vec<RecordId>, CoreError>;
    async fn get_all(&self) -> Vec<Task>;
    async fn get_by_id(&self, id: RecordId) -> Result<Task, CoreError>;
    async fn get_by_category(&self, name: &str) -> Vec<Task>;
    /// Case-insensitive substring match over title or category.
    async fn search(&self, term: &str) -> Vec<Task>;
    async fn reorder(&self, id: RecordId, new_order: i64) -> bool;
    async fn toggle_completed(&self, id: RecordId) -> Result<Task, CoreError>;
    async fn counts(&self) -> TaskCounts;
}

/// [`TaskRepository`] over any [`Store`].
pub struct StoreTaskRepository<S: Store> {
    store: S,
    orders: OrderAllocator,
}

impl<S: Store> StoreTaskRepository<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            orders: OrderAllocator::new(),
        }
    }

    /// Get a reference to the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    pub(crate) fn orders(&self) -> &OrderAllocator {
        &self.orders
    }
}
