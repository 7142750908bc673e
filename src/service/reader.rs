//! Generic reads: list, cursor page, fetch by key.

use crate::catalog::{Catalog, TableCatalogEntry};
use crate::codec;
use crate::error::AppError;
use crate::service::GenericRecord;
use crate::sql::{self, MySqlBindValue, QueryBuf};
use sqlx::mysql::MySqlRow;
use sqlx::MySqlPool;

pub struct RecordReader;

impl RecordReader {
    /// Full unfiltered scan, decoded row by row. Unbounded; meant for small
    /// administrative tables.
    pub async fn list_all(
        pool: &MySqlPool,
        catalog: &Catalog,
        table: &str,
    ) -> Result<Vec<GenericRecord>, AppError> {
        let entry = lookup(catalog, table)?;
        let q = sql::select_all(entry);
        let rows = fetch_all(pool, &q).await?;
        Ok(rows.iter().map(|r| decode_row(r, entry)).collect())
    }

    /// Cursor page ordered by primary key: rows with pk > offset, at most
    /// `limit` of them. Undefined for tables without a primary key.
    pub async fn list_page(
        pool: &MySqlPool,
        catalog: &Catalog,
        table: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<GenericRecord>, AppError> {
        let entry = lookup(catalog, table)?;
        let pk = primary_key(entry)?;
        let q = sql::select_page(entry, pk, limit, offset);
        let rows = fetch_all(pool, &q).await?;
        Ok(rows.iter().map(|r| decode_row(r, entry)).collect())
    }

    /// Fetch the unique row matching the primary key.
    pub async fn get_by_key(
        pool: &MySqlPool,
        catalog: &Catalog,
        table: &str,
        key: i64,
    ) -> Result<GenericRecord, AppError> {
        let entry = lookup(catalog, table)?;
        let pk = primary_key(entry)?;
        let q = sql::select_by_key(entry, pk, key);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(MySqlBindValue::from_json(p));
        }
        let row = query
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound("record not found".into()))?;
        Ok(decode_row(&row, entry))
    }
}

pub(crate) fn lookup<'a>(catalog: &'a Catalog, table: &str) -> Result<&'a TableCatalogEntry, AppError> {
    catalog
        .lookup(table)
        .ok_or_else(|| AppError::NotFound("unknown table".into()))
}

pub(crate) fn primary_key<'a>(entry: &'a TableCatalogEntry) -> Result<&'a str, AppError> {
    entry
        .primary_key()
        .map(|c| c.name.as_str())
        .ok_or_else(|| AppError::Unsupported(format!("table {} has no primary key", entry.name)))
}

/// Decode a row positionally against the entry's column order. Columns whose
/// category is unknown are omitted from the record.
pub(crate) fn decode_row(row: &MySqlRow, entry: &TableCatalogEntry) -> GenericRecord {
    let mut record = GenericRecord::new();
    for (i, col) in entry.columns.iter().enumerate() {
        if let Some(v) = codec::decode(codec::raw_cell(row, i), col) {
            record.insert(col.name.clone(), v);
        }
    }
    record
}

async fn fetch_all(pool: &MySqlPool, q: &QueryBuf) -> Result<Vec<MySqlRow>, AppError> {
    tracing::debug!(sql = %q.sql, params = ?q.params, "query");
    let mut query = sqlx::query(&q.sql);
    for p in &q.params {
        query = query.bind(MySqlBindValue::from_json(p));
    }
    Ok(query.fetch_all(pool).await?)
}
