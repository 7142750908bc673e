//! Autocrud: exposes an arbitrary MySQL schema as a generic CRUD API.
//!
//! The table catalog is introspected once at startup; reads and writes build
//! their SQL dynamically from the catalog, with no per-table code anywhere.

pub mod catalog;
pub mod codec;
pub mod error;
pub mod response;
pub mod routes;
pub mod sql;
pub mod state;
pub mod service;
pub mod handlers;

pub use catalog::{Catalog, Category, ColumnDescriptor, TableCatalogEntry};
pub use codec::{decode, validate_for_write, RawCell, RejectReason};
pub use error::AppError;
pub use routes::record_routes;
pub use service::{GenericRecord, RecordReader, RecordWriter};
pub use state::AppState;
