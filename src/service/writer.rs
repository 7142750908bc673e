//! Generic writes: insert with defaulting, partial update, delete.
//!
//! Each write is planned as a pure pass over the catalog entry (validation
//! and defaulting, all-or-nothing) and only then executed.

use crate::catalog::{Category, TableCatalogEntry};
use crate::codec;
use crate::error::AppError;
use crate::service::reader::{lookup, primary_key};
use crate::service::{GenericRecord, RecordReader};
use crate::sql::{self, MySqlBindValue, QueryBuf};
use serde_json::Value;
use sqlx::mysql::MySqlQueryResult;
use sqlx::MySqlPool;

pub struct RecordWriter;

impl RecordWriter {
    /// Insert one row. Every non-primary-key column appears in the statement
    /// unless the store has its own default for it: supplied values are
    /// validated, absent ones fall back to null when nullable, else to the
    /// category's zero value. Returns the store-generated key.
    pub async fn insert(
        pool: &MySqlPool,
        catalog: &crate::catalog::Catalog,
        table: &str,
        input: &GenericRecord,
    ) -> Result<u64, AppError> {
        let entry = lookup(catalog, table)?;
        let values = plan_insert(entry, input)?;
        let q = sql::insert(entry, &values);
        let result = execute(pool, &q).await?;
        Ok(result.last_insert_id())
    }

    /// Partial update by key. The existing row is fetched first (propagating
    /// NotFound / no-PK errors), then every supplied field naming a real
    /// column is validated before anything is written. Unknown field names
    /// are ignored; an empty accepted set is a successful no-op.
    pub async fn update(
        pool: &MySqlPool,
        catalog: &crate::catalog::Catalog,
        table: &str,
        key: i64,
        input: &GenericRecord,
    ) -> Result<u64, AppError> {
        let entry = lookup(catalog, table)?;
        let _existing = RecordReader::get_by_key(pool, catalog, table, key).await?;
        let pk = primary_key(entry)?;

        let sets = plan_update(entry, input)?;
        if sets.is_empty() {
            return Ok(0);
        }
        // The read above and this write are separate statements; a concurrent
        // delete in between turns this into an update of zero rows.
        let q = sql::update(entry, pk, &sets, key);
        let result = execute(pool, &q).await?;
        Ok(result.rows_affected())
    }

    /// Unconditional delete by primary key; zero affected rows is success.
    pub async fn delete_by_key(
        pool: &MySqlPool,
        catalog: &crate::catalog::Catalog,
        table: &str,
        key: i64,
    ) -> Result<u64, AppError> {
        let entry = lookup(catalog, table)?;
        let pk = primary_key(entry)?;
        let q = sql::delete(entry, pk, key);
        let result = execute(pool, &q).await?;
        Ok(result.rows_affected())
    }
}

/// Build the insert column/value list in catalog order. Primary-key columns
/// are skipped even when the client supplies them; a non-nullable column with
/// no store default is never left unspecified.
fn plan_insert(
    entry: &TableCatalogEntry,
    input: &GenericRecord,
) -> Result<Vec<(String, Value)>, AppError> {
    let mut values = Vec::with_capacity(entry.columns.len());
    for col in &entry.columns {
        if col.is_primary_key {
            continue;
        }
        match input.get(&col.name) {
            Some(v) => {
                codec::validate_for_write(v, col).map_err(|reason| AppError::Validation {
                    column: col.name.clone(),
                    reason,
                })?;
                values.push((col.name.clone(), v.clone()));
            }
            None if col.has_default => {}
            None if col.nullable => values.push((col.name.clone(), Value::Null)),
            None => values.push((col.name.clone(), zero_value(col.category))),
        }
    }
    Ok(values)
}

/// Accepted field set for an update: every supplied field that names a real
/// column, validated up front; any rejection aborts the whole update.
fn plan_update(
    entry: &TableCatalogEntry,
    input: &GenericRecord,
) -> Result<Vec<(String, Value)>, AppError> {
    let mut sets = Vec::new();
    for col in &entry.columns {
        if let Some(v) = input.get(&col.name) {
            codec::validate_for_write(v, col).map_err(|reason| AppError::Validation {
                column: col.name.clone(),
                reason,
            })?;
            sets.push((col.name.clone(), v.clone()));
        }
    }
    Ok(sets)
}

fn zero_value(category: Category) -> Value {
    match category {
        Category::Integer => Value::Number(0.into()),
        Category::Real => serde_json::Number::from_f64(0.0)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Category::Text | Category::Other => Value::String(String::new()),
    }
}

async fn execute(pool: &MySqlPool, q: &QueryBuf) -> Result<MySqlQueryResult, AppError> {
    tracing::debug!(sql = %q.sql, params = ?q.params, "execute");
    let mut query = sqlx::query(&q.sql);
    for p in &q.params {
        query = query.bind(MySqlBindValue::from_json(p));
    }
    query.execute(pool).await.map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict(db.message().to_string())
        }
        _ => AppError::Db(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::categorize;
    use crate::catalog::ColumnDescriptor;
    use crate::codec::RejectReason;
    use serde_json::json;

    fn col(name: &str, ty: &str, nullable: bool, pk: bool, has_default: bool) -> ColumnDescriptor {
        ColumnDescriptor {
            name: name.into(),
            declared_type: ty.into(),
            category: categorize(ty),
            nullable,
            is_primary_key: pk,
            has_default,
        }
    }

    fn users() -> TableCatalogEntry {
        TableCatalogEntry {
            name: "users".into(),
            columns: vec![
                col("id", "int(11)", false, true, false),
                col("name", "varchar(45)", false, false, false),
                col("age", "int(11)", true, false, false),
            ],
        }
    }

    fn record(v: serde_json::Value) -> GenericRecord {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn insert_substitutes_null_for_absent_nullable_columns() {
        let values = plan_insert(&users(), &record(json!({"name": "Ann"}))).unwrap();
        assert_eq!(
            values,
            vec![
                ("name".to_string(), json!("Ann")),
                ("age".to_string(), Value::Null),
            ]
        );
    }

    #[test]
    fn insert_substitutes_zero_values_for_absent_required_columns() {
        let values = plan_insert(&users(), &record(json!({}))).unwrap();
        assert_eq!(
            values,
            vec![
                ("name".to_string(), json!("")),
                ("age".to_string(), Value::Null),
            ]
        );
    }

    #[test]
    fn insert_omits_columns_with_store_defaults() {
        let entry = TableCatalogEntry {
            name: "t".into(),
            columns: vec![
                col("id", "int(11)", false, true, false),
                col("status", "varchar(10)", false, false, true),
            ],
        };
        let values = plan_insert(&entry, &record(json!({}))).unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn insert_ignores_client_supplied_primary_key() {
        let values = plan_insert(&users(), &record(json!({"id": 99, "name": "Ann"}))).unwrap();
        assert!(values.iter().all(|(name, _)| name != "id"));
    }

    #[test]
    fn insert_rejection_names_the_offending_column() {
        let err = plan_insert(&users(), &record(json!({"name": 5}))).unwrap_err();
        match err {
            AppError::Validation { column, reason } => {
                assert_eq!(column, "name");
                assert_eq!(reason, RejectReason::TypeMismatch);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn update_rejects_primary_key_in_input() {
        let err = plan_update(&users(), &record(json!({"id": 99, "name": "Bob"}))).unwrap_err();
        match err {
            AppError::Validation { column, reason } => {
                assert_eq!(column, "id");
                assert_eq!(reason, RejectReason::PrimaryKeyImmutable);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn update_ignores_unknown_fields() {
        let sets = plan_update(&users(), &record(json!({"nope": 1, "name": "Bob"}))).unwrap();
        assert_eq!(sets, vec![("name".to_string(), json!("Bob"))]);
    }

    #[test]
    fn update_with_nothing_accepted_is_empty_not_an_error() {
        let sets = plan_update(&users(), &record(json!({"nope": 1}))).unwrap();
        assert!(sets.is_empty());
    }

    #[test]
    fn update_rejects_null_into_non_nullable_column() {
        let err = plan_update(&users(), &record(json!({"name": null}))).unwrap_err();
        match err {
            AppError::Validation { column, reason } => {
                assert_eq!(column, "name");
                assert_eq!(reason, RejectReason::NullNotAllowed);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn zero_value_per_category() {
        assert_eq!(zero_value(Category::Integer), json!(0));
        assert_eq!(zero_value(Category::Real), json!(0.0));
        assert_eq!(zero_value(Category::Text), json!(""));
    }
}
