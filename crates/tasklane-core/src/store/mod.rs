//! The persistence collaborator.
//!
//! A [`Store`] performs CRUD over named collections of loosely typed
//! records. Bulk writes report one [`RecordOutcome`] per submitted record so
//! callers can tell partial success from total failure.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::models::RecordId;
use crate::query::RecordQuery;

pub mod query_builder;
pub mod sqlite;

pub use sqlite::SqliteStore;

/// A record as the store sees it: field name to JSON value.
pub type Record = Map<String, Value>;

/// Field under which every store exposes a record's identifier.
pub const ID_FIELD: &str = "Id";

/// Per-record result of a bulk write.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordOutcome {
    pub id: Option<RecordId>,
    pub success: bool,
    pub data: Option<Record>,
    pub error: Option<String>,
}

impl RecordOutcome {
    pub fn succeeded(id: RecordId, data: Option<Record>) -> Self {
        Self {
            id: Some(id),
            success: true,
            data,
            error: None,
        }
    }

    pub fn failed(id: Option<RecordId>, error: impl Into<String>) -> Self {
        Self {
            id,
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Splits outcomes into successes and failures, preserving order.
pub fn partition_outcomes(outcomes: Vec<RecordOutcome>) -> (Vec<RecordOutcome>, Vec<RecordOutcome>) {
    outcomes.into_iter().partition(|outcome| outcome.success)
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn fetch(&self, collection: &str, query: &RecordQuery) -> Result<Vec<Record>, CoreError>;
    async fn get_by_id(&self, collection: &str, id: RecordId) -> Result<Option<Record>, CoreError>;
    async fn insert_many(&self, collection: &str, records: Vec<Record>) -> Result<Vec<RecordOutcome>, CoreError>;
    async fn update_many(
        &self,
        collection: &str,
        records: Vec<(RecordId, Record)>,
    ) -> Result<Vec<RecordOutcome>, CoreError>;
    async fn delete_many(&self, collection: &str, ids: &[RecordId]) -> Result<Vec<RecordOutcome>, CoreError>;
}
