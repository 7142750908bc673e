//! Stateless record services: reads and writes driven by the catalog.

mod reader;
mod writer;

pub use reader::RecordReader;
pub use writer::RecordWriter;

/// One row as an insertion-ordered name -> typed-value mapping, used for both
/// read results and write inputs. Ordering relies on serde_json's
/// `preserve_order` feature.
pub type GenericRecord = serde_json::Map<String, serde_json::Value>;
