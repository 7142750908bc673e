//! Typed errors and HTTP mapping.

use crate::codec::RejectReason;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Schema introspection failed at startup. Never produced after the
    /// catalog has been published.
    #[error("introspection: {0}")]
    Introspection(String),
    #[error("{0}")]
    NotFound(String),
    /// The operation is undefined for the table's key shape (no primary key).
    #[error("unsupported operation: {0}")]
    Unsupported(String),
    #[error("field {column} invalid: {reason}")]
    Validation { column: String, reason: RejectReason },
    #[error("{0}")]
    BadRequest(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Introspection(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unsupported(_) => StatusCode::BAD_REQUEST,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Db(e) => {
                if let sqlx::Error::RowNotFound = e {
                    StatusCode::NOT_FOUND
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }
        let message = if let AppError::Db(sqlx::Error::RowNotFound) = &self {
            "record not found".to_string()
        } else {
            self.to_string()
        };
        let body = crate::response::error_body(message);
        (status, Json(body)).into_response()
    }
}
