use serde_json::Value;
use sqlx::{QueryBuilder, Sqlite};

use crate::query::{Comparison, Condition, Direction, Operator, RecordQuery};
use crate::store::ID_FIELD;

/// Utility functions for building SQL over the `records` table from a [`RecordQuery`]
pub struct SqlQueryBuilder;

impl SqlQueryBuilder {
    /// Build the full `SELECT id, data` statement for a collection
    pub fn build_select<'a>(collection: &str, query: &RecordQuery) -> QueryBuilder<'a, Sqlite> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT id, data FROM records WHERE collection = ");
        qb.push_bind(collection.to_string());

        if let Some(condition) = &query.filter {
            qb.push(" AND (");
            Self::build_sql_where_clause(condition, &mut qb);
            qb.push(")");
        }

        qb.push(" ORDER BY ");
        for order in &query.order_by {
            Self::push_field(&order.field, &mut qb);
            match order.direction {
                Direction::Asc => qb.push(" ASC, "),
                Direction::Desc => qb.push(" DESC, "),
            };
        }
        // stable tie-breaker
        qb.push("id ASC");

        if let Some(limit) = query.limit {
            qb.push(" LIMIT ");
            qb.push_bind(i64::from(limit));
        }

        qb
    }

    /// Build a SQL WHERE clause from a condition tree
    pub fn build_sql_where_clause<'a>(condition: &Condition, qb: &mut QueryBuilder<'a, Sqlite>) {
        match condition {
            Condition::Field { field, op, value } => match op {
                Comparison::EqualTo => Self::build_equality_clause(field, value, qb),
                Comparison::Contains => {
                    qb.push("instr(CAST(");
                    Self::push_folded_field(field, qb);
                    qb.push(" AS TEXT), ");
                    qb.push_bind(Self::text_of(value).to_lowercase());
                    qb.push(") > 0");
                }
            },
            Condition::Group { op, conditions } => {
                if conditions.is_empty() {
                    // identity element of the operator
                    match op {
                        Operator::And => qb.push("1 = 1"),
                        Operator::Or => qb.push("1 = 0"),
                    };
                    return;
                }

                for (i, condition) in conditions.iter().enumerate() {
                    if i > 0 {
                        match op {
                            Operator::And => qb.push(" AND "),
                            Operator::Or => qb.push(" OR "),
                        };
                    }
                    qb.push("(");
                    Self::build_sql_where_clause(condition, qb);
                    qb.push(")");
                }
            }
        }
    }

    fn build_equality_clause<'a>(field: &str, value: &Value, qb: &mut QueryBuilder<'a, Sqlite>) {
        Self::push_field(field, qb);
        match value {
            Value::Null => {
                qb.push(" IS NULL");
            }
            // json_extract reports booleans as 0/1
            Value::Bool(b) => {
                qb.push(" = ");
                qb.push_bind(i64::from(*b));
            }
            Value::Number(n) => {
                qb.push(" = ");
                if let Some(i) = n.as_i64() {
                    qb.push_bind(i);
                } else {
                    qb.push_bind(n.as_f64().unwrap_or_default());
                }
            }
            Value::String(s) => {
                qb.push(" = ");
                qb.push_bind(s.clone());
            }
            other => {
                qb.push(" = json(");
                qb.push_bind(other.to_string());
                qb.push(")");
            }
        }
    }

    /// Column expression for a record field
    fn push_field<'a>(field: &str, qb: &mut QueryBuilder<'a, Sqlite>) {
        if field == ID_FIELD {
            qb.push("id");
        } else {
            qb.push("json_extract(data, ");
            qb.push_bind(Self::json_path(field));
            qb.push(")");
        }
    }

    /// Field read from the lowercased `folded` copy, whose keys are lowercased too
    fn push_folded_field<'a>(field: &str, qb: &mut QueryBuilder<'a, Sqlite>) {
        if field == ID_FIELD {
            qb.push("id");
        } else {
            qb.push("json_extract(folded, ");
            qb.push_bind(Self::json_path(&field.to_lowercase()));
            qb.push(")");
        }
    }

    /// Quoted so field names containing dots stay a single path segment
    fn json_path(field: &str) -> String {
        format!("$.\"{}\"", field.replace('"', "\\\""))
    }

    fn text_of(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}
