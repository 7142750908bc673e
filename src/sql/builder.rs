//! Builds parameterized SELECT, INSERT, UPDATE, DELETE from catalog entries.
//!
//! Identifiers come only from the introspected catalog; every value goes
//! through a `?` placeholder.

use crate::catalog::TableCatalogEntry;
use serde_json::Value;

/// Quote an identifier for MySQL.
pub fn quoted(s: &str) -> String {
    format!("`{}`", s.replace('`', "``"))
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }
}

/// Explicit column list in catalog order, so positional decode lines up with
/// the entry's descriptors.
fn select_column_list(entry: &TableCatalogEntry) -> String {
    entry
        .columns
        .iter()
        .map(|c| quoted(&c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Full unfiltered scan.
pub fn select_all(entry: &TableCatalogEntry) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!("SELECT {} FROM {}", select_column_list(entry), quoted(&entry.name));
    q
}

/// Cursor page: rows whose primary key exceeds `offset`, ascending, capped at
/// `limit`.
pub fn select_page(entry: &TableCatalogEntry, pk: &str, limit: i64, offset: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let pk = quoted(pk);
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} > ? ORDER BY {} LIMIT ?",
        select_column_list(entry),
        quoted(&entry.name),
        pk,
        pk
    );
    q.params.push(Value::Number(offset.into()));
    q.params.push(Value::Number(limit.into()));
    q
}

/// SELECT by primary key.
pub fn select_by_key(entry: &TableCatalogEntry, pk: &str, key: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = ?",
        select_column_list(entry),
        quoted(&entry.name),
        quoted(pk)
    );
    q.params.push(Value::Number(key.into()));
    q
}

/// INSERT from an already-validated, already-defaulted column/value list
/// (catalog order, primary key excluded).
pub fn insert(entry: &TableCatalogEntry, values: &[(String, Value)]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::with_capacity(values.len());
    let mut placeholders = Vec::with_capacity(values.len());
    for (name, val) in values {
        cols.push(quoted(name));
        placeholders.push("?");
        q.params.push(val.clone());
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quoted(&entry.name),
        cols.join(", "),
        placeholders.join(", ")
    );
    q
}

/// UPDATE by primary key: SET only the accepted fields.
pub fn update(entry: &TableCatalogEntry, pk: &str, sets: &[(String, Value)], key: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut assignments = Vec::with_capacity(sets.len());
    for (name, val) in sets {
        assignments.push(format!("{} = ?", quoted(name)));
        q.params.push(val.clone());
    }
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ?",
        quoted(&entry.name),
        assignments.join(", "),
        quoted(pk)
    );
    q.params.push(Value::Number(key.into()));
    q
}

/// DELETE by primary key.
pub fn delete(entry: &TableCatalogEntry, pk: &str, key: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "DELETE FROM {} WHERE {} = ?",
        quoted(&entry.name),
        quoted(pk)
    );
    q.params.push(Value::Number(key.into()));
    q
}
