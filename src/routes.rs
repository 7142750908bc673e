//! Route assembly. Verb mapping follows the wire contract: PUT on the table
//! creates, POST on the key updates.

use crate::handlers::records::{create, delete as delete_handler, list, read, tables, update};
use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::limit::RequestBodyLimitLayer;

const BODY_LIMIT_BYTES: usize = 1024 * 1024;

pub fn record_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(tables))
        .route("/:table", get(list).put(create))
        .route(
            "/:table/:key",
            get(read).post(update).delete(delete_handler),
        )
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .with_state(state)
}
