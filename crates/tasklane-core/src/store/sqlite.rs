use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::db::DbPool;
use crate::error::CoreError;
use crate::models::RecordId;
use crate::query::RecordQuery;
use crate::store::query_builder::SqlQueryBuilder;
use crate::store::{Record, RecordOutcome, Store, ID_FIELD};

/// [`Store`] keeping each record as a JSON document in SQLite.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn decode_row(id: RecordId, data: &str) -> Result<Record, CoreError> {
        let mut record: Record = serde_json::from_str(data)?;
        record.insert(ID_FIELD.to_string(), Value::from(id));
        Ok(record)
    }

    fn encode_record(record: &Record) -> Result<String, CoreError> {
        let mut stored = record.clone();
        stored.remove(ID_FIELD);
        Ok(serde_json::to_string(&stored)?)
    }

    /// Lowercased document text used for substring matching.
    fn fold(data: &str) -> String {
        data.to_lowercase()
    }

    fn project(record: Record, fields: &[String]) -> Record {
        if fields.is_empty() {
            return record;
        }
        record
            .into_iter()
            .filter(|(key, _)| key == ID_FIELD || fields.iter().any(|f| f == key))
            .collect()
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn fetch(&self, collection: &str, query: &RecordQuery) -> Result<Vec<Record>, CoreError> {
        let mut qb = SqlQueryBuilder::build_select(collection, query);
        let rows: Vec<(i64, String)> = qb.build_query_as().fetch_all(&self.pool).await?;

        rows.iter()
            .map(|(id, data)| Self::decode_row(*id, data).map(|r| Self::project(r, &query.fields)))
            .collect()
    }

    async fn get_by_id(&self, collection: &str, id: RecordId) -> Result<Option<Record>, CoreError> {
        let row: Option<(i64, String)> =
            sqlx::query_as("SELECT id, data FROM records WHERE collection = $1 AND id = $2")
                .bind(collection)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|(id, data)| Self::decode_row(id, &data)).transpose()
    }

    async fn insert_many(&self, collection: &str, records: Vec<Record>) -> Result<Vec<RecordOutcome>, CoreError> {
        let mut tx = self.pool.begin().await?;
        let mut outcomes = Vec::with_capacity(records.len());

        for record in records {
            let data = match Self::encode_record(&record) {
                Ok(data) => data,
                Err(e) => {
                    outcomes.push(RecordOutcome::failed(None, e.to_string()));
                    continue;
                }
            };

            let inserted: Result<(i64,), sqlx::Error> =
                sqlx::query_as(
                    "INSERT INTO records (collection, data, folded) VALUES ($1, $2, $3) RETURNING id",
                )
                .bind(collection)
                .bind(&data)
                .bind(Self::fold(&data))
                .fetch_one(&mut *tx)
                .await;

            match inserted {
                Ok((id,)) => {
                    let mut stored = record;
                    stored.insert(ID_FIELD.to_string(), Value::from(id));
                    outcomes.push(RecordOutcome::succeeded(id, Some(stored)));
                }
                Err(e) => outcomes.push(RecordOutcome::failed(None, e.to_string())),
            }
        }

        tx.commit().await?;
        debug!(collection, count = outcomes.len(), "inserted records");
        Ok(outcomes)
    }

    async fn update_many(
        &self,
        collection: &str,
        records: Vec<(RecordId, Record)>,
    ) -> Result<Vec<RecordOutcome>, CoreError> {
        let mut tx = self.pool.begin().await?;
        let mut outcomes = Vec::with_capacity(records.len());

        for (id, changes) in records {
            let current: Option<(String,)> =
                sqlx::query_as("SELECT data FROM records WHERE collection = $1 AND id = $2")
                    .bind(collection)
                    .bind(id)
                    .fetch_optional(&mut *tx)
                    .await?;

            let Some((data,)) = current else {
                outcomes.push(RecordOutcome::failed(Some(id), format!("Record {} not found", id)));
                continue;
            };

            // fields absent from `changes` keep their stored value
            let mut merged = Self::decode_row(id, &data)?;
            for (key, value) in changes {
                if key != ID_FIELD {
                    merged.insert(key, value);
                }
            }

            let data = Self::encode_record(&merged)?;
            sqlx::query("UPDATE records SET data = $1, folded = $2 WHERE collection = $3 AND id = $4")
                .bind(&data)
                .bind(Self::fold(&data))
                .bind(collection)
                .bind(id)
                .execute(&mut *tx)
                .await?;

            outcomes.push(RecordOutcome::succeeded(id, Some(merged)));
        }

        tx.commit().await?;
        Ok(outcomes)
    }

    async fn delete_many(&self, collection: &str, ids: &[RecordId]) -> Result<Vec<RecordOutcome>, CoreError> {
        let mut tx = self.pool.begin().await?;
        let mut outcomes = Vec::with_capacity(ids.len());

        for &id in ids {
            let result = sqlx::query("DELETE FROM records WHERE collection = $1 AND id = $2")
                .bind(collection)
                .bind(id)
                .execute(&mut *tx)
                .await?;

            if result.rows_affected() == 0 {
                outcomes.push(RecordOutcome::failed(Some(id), format!("Record {} not found", id)));
            } else {
                outcomes.push(RecordOutcome::succeeded(id, None));
            }
        }

        tx.commit().await?;
        Ok(outcomes)
    }
}
