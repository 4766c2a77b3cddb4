//! SQLite backend for the FRBR catalogue.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime.

mod encode;
mod store;

pub mod error;
pub mod introspect;
pub mod schema;

pub use error::{Error, Result};
pub use introspect::{ColumnInfo, TableInfo};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
