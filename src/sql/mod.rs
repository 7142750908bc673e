//! Dynamic SQL construction and parameter binding.

mod builder;
mod params;

pub use builder::{
    delete, insert, quoted, select_all, select_by_key, select_page, update, QueryBuf,
};
pub use params::MySqlBindValue;
