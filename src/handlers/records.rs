//! Record CRUD handlers: table listing, list/page, read, create, update, delete.

use crate::error::AppError;
use crate::response::success;
use crate::service::{GenericRecord, RecordReader, RecordWriter};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;

fn parse_key(key_str: &str) -> Result<i64, AppError> {
    key_str
        .parse()
        .map_err(|_| AppError::BadRequest("bad key value".into()))
}

fn body_to_record(value: Value) -> Result<GenericRecord, AppError> {
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

/// Parse a pagination parameter: absent or present-but-empty falls back to
/// the default, anything non-numeric is a client error.
fn parse_page_param(
    params: &HashMap<String, String>,
    name: &str,
    default: i64,
) -> Result<i64, AppError> {
    match params.get(name).map(|s| s.as_str()) {
        None | Some("") => Ok(default),
        Some(s) => s
            .parse()
            .map_err(|_| AppError::BadRequest(format!("bad {} parameter", name))),
    }
}

pub async fn tables(State(state): State<AppState>) -> Result<impl axum::response::IntoResponse, AppError> {
    Ok(success(json!({ "tables": state.catalog.table_names() })))
}

pub async fn list(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let paged = params.contains_key("limit") || params.contains_key("offset");
    let records = if paged {
        let limit = parse_page_param(&params, "limit", 5)?;
        if limit < 0 {
            return Err(AppError::BadRequest("bad limit parameter".into()));
        }
        let offset = parse_page_param(&params, "offset", 0)?;
        RecordReader::list_page(&state.pool, &state.catalog, &table, limit, offset).await?
    } else {
        RecordReader::list_all(&state.pool, &state.catalog, &table).await?
    };
    Ok(success(json!({ "records": records })))
}

pub async fn read(
    State(state): State<AppState>,
    Path((table, key_str)): Path<(String, String)>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    if state.catalog.lookup(&table).is_none() {
        return Err(AppError::NotFound("unknown table".into()));
    }
    let key = parse_key(&key_str)?;
    let record = RecordReader::get_by_key(&state.pool, &state.catalog, &table, key).await?;
    Ok(success(json!({ "record": record })))
}

pub async fn create(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let record = body_to_record(body)?;
    let id = RecordWriter::insert(&state.pool, &state.catalog, &table, &record).await?;
    Ok(success(json!({ "id": id })))
}

pub async fn update(
    State(state): State<AppState>,
    Path((table, key_str)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    if state.catalog.lookup(&table).is_none() {
        return Err(AppError::NotFound("unknown table".into()));
    }
    let key = parse_key(&key_str)?;
    let record = body_to_record(body)?;
    RecordWriter::update(&state.pool, &state.catalog, &table, key, &record).await?;
    Ok(success(json!({ "updated": 1 })))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((table, key_str)): Path<(String, String)>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    if state.catalog.lookup(&table).is_none() {
        return Err(AppError::NotFound("unknown table".into()));
    }
    let key = parse_key(&key_str)?;
    let deleted = RecordWriter::delete_by_key(&state.pool, &state.catalog, &table, key).await?;
    Ok(success(json!({ "deleted": deleted })))
}
