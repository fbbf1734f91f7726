use serde_json::Value;
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::CoreError;
use crate::query::{Direction, RecordQuery};
use crate::schema::{fields, TASK_COLLECTION};
use crate::store::Store;

/// Hands out `order` values for new tasks.
///
/// Each reservation reads the highest stored order and also remembers what
/// it already handed out, so overlapping creates through the same allocator
/// get disjoint ranges even before their inserts land. Writers in other
/// processes are not coordinated.
#[derive(Debug)]
pub struct OrderAllocator {
    next: Mutex<i64>,
}

impl Default for OrderAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderAllocator {
    pub fn new() -> Self {
        Self {
            next: Mutex::new(i64::MIN),
        }
    }

    /// Reserves `count` consecutive values and returns the first.
    ///
    /// Fails with [`CoreError::Validation`] when the range would run past
    /// `i64::MAX`; nothing is reserved in that case.
    pub async fn reserve<S: Store + ?Sized>(&self, store: &S, count: usize) -> Result<i64, CoreError> {
        let mut next = self.next.lock().await;
        let stored_max = current_max_order(store).await?;

        let exhausted = || {
            CoreError::Validation(format!(
                "No order values left above {}; move tasks to lower positions first",
                stored_max
            ))
        };
        let first = stored_max.checked_add(1).ok_or_else(exhausted)?.max(*next);
        let end = i64::try_from(count)
            .ok()
            .and_then(|count| first.checked_add(count))
            .ok_or_else(exhausted)?;

        *next = end;
        Ok(first)
    }
}

/// Highest `order` among stored tasks, or 0 when there are none.
pub async fn current_max_order<S: Store + ?Sized>(store: &S) -> Result<i64, CoreError> {
    let query = RecordQuery::new()
        .select([fields::ORDER])
        .order_by(fields::ORDER, Direction::Desc)
        .limit(1);

    let records = store.fetch(TASK_COLLECTION, &query).await?;
    Ok(records
        .first()
        .and_then(|r| r.get(fields::ORDER))
        .map_or(0, order_value))
}

/// Reads a stored order, rounding fractional values up so new orders stay above it.
fn order_value(value: &Value) -> i64 {
    if let Some(order) = value.as_i64() {
        return order;
    }
    match value.as_f64() {
        // `as` saturates at the i64 bounds
        Some(order) => {
            warn!(order = %value, "non-integer order stored; rounding up");
            order.ceil() as i64
        }
        None => {
            warn!(order = %value, "unreadable order stored; treating as 0");
            0
        }
    }
}
