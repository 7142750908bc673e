//! Column catalog: startup schema introspection.
//!
//! Built once from `SHOW TABLES` + `SHOW FULL COLUMNS` and immutable for the
//! process lifetime. Column order is the store's reported order and is
//! authoritative for positional row decoding.

use crate::error::AppError;
use sqlx::{MySqlPool, Row};
use std::collections::HashMap;

/// Coarse kind a declared column type is classified into. Computed once at
/// catalog build; both decode and write validation dispatch on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Text,
    Integer,
    Real,
    Other,
}

/// Classify a free-form declared type string (e.g. "varchar(45)", "int(11)",
/// "decimal(10,2)") by substring, never by exact equality.
pub fn categorize(declared_type: &str) -> Category {
    let t = declared_type.to_ascii_lowercase();
    if t.contains("char") || t.contains("text") {
        Category::Text
    } else if t.contains("int") {
        Category::Integer
    } else if t.contains("double") || t.contains("decimal") || t.contains("float") {
        Category::Real
    } else {
        Category::Other
    }
}

#[derive(Clone, Debug)]
pub struct ColumnDescriptor {
    pub name: String,
    pub declared_type: String,
    pub category: Category,
    pub nullable: bool,
    pub is_primary_key: bool,
    pub has_default: bool,
}

#[derive(Clone, Debug)]
pub struct TableCatalogEntry {
    pub name: String,
    pub columns: Vec<ColumnDescriptor>,
}

impl TableCatalogEntry {
    /// First column flagged as primary key, if the table declares one.
    /// Callers must handle the no-PK case; `id` is never assumed.
    pub fn primary_key(&self) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.is_primary_key)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[derive(Clone, Debug)]
pub struct Catalog {
    tables: HashMap<String, TableCatalogEntry>,
    /// Discovery order, for `GET /`.
    names: Vec<String>,
}

impl Catalog {
    /// Introspect every table in the connected database. Any metadata query
    /// failure aborts the build; a partial catalog is never published.
    pub async fn build(pool: &MySqlPool) -> Result<Catalog, AppError> {
        let rows = sqlx::query("SHOW TABLES")
            .fetch_all(pool)
            .await
            .map_err(|e| AppError::Introspection(e.to_string()))?;
        let mut names = Vec::with_capacity(rows.len());
        for row in &rows {
            names.push(string_cell(row, 0));
        }

        let mut tables = HashMap::with_capacity(names.len());
        for name in &names {
            let entry = introspect_table(pool, name).await?;
            tables.insert(name.clone(), entry);
        }
        tracing::info!(tables = names.len(), "catalog built");
        Ok(Catalog { tables, names })
    }

    /// Absence is the normal unknown-table outcome, not an internal error.
    pub fn lookup(&self, table: &str) -> Option<&TableCatalogEntry> {
        self.tables.get(table)
    }

    pub fn table_names(&self) -> &[String] {
        &self.names
    }
}

async fn introspect_table(pool: &MySqlPool, name: &str) -> Result<TableCatalogEntry, AppError> {
    let sql = format!("SHOW FULL COLUMNS FROM {}", crate::sql::quoted(name));
    tracing::debug!(sql = %sql, "introspect");
    let rows = sqlx::query(&sql)
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::Introspection(format!("{}: {}", name, e)))?;

    let mut columns = Vec::with_capacity(rows.len());
    for row in &rows {
        // SHOW FULL COLUMNS: Field, Type, Collation, Null, Key, Default, ...
        let field = string_cell(row, 0);
        let declared_type = string_cell(row, 1);
        let nullable = string_cell(row, 3).eq_ignore_ascii_case("YES");
        let is_primary_key = string_cell(row, 4) == "PRI";
        let has_default = opt_string_cell(row, 5).is_some();
        columns.push(ColumnDescriptor {
            category: categorize(&declared_type),
            name: field,
            declared_type,
            nullable,
            is_primary_key,
            has_default,
        });
    }
    Ok(TableCatalogEntry {
        name: name.to_string(),
        columns,
    })
}

/// Metadata cells come back as text or binary depending on server version.
fn string_cell(row: &sqlx::mysql::MySqlRow, idx: usize) -> String {
    opt_string_cell(row, idx).unwrap_or_default()
}

fn opt_string_cell(row: &sqlx::mysql::MySqlRow, idx: usize) -> Option<String> {
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(idx) {
        return Some(s);
    }
    if let Ok(Some(b)) = row.try_get::<Option<Vec<u8>>, _>(idx) {
        return Some(String::from_utf8_lossy(&b).into_owned());
    }
    None
}
