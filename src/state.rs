//! Shared application state for all routes.

use crate::catalog::Catalog;
use sqlx::MySqlPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: MySqlPool,
    /// Built once at startup, immutable afterward; no lock needed.
    pub catalog: Arc<Catalog>,
}
