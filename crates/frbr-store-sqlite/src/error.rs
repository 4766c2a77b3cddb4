//! Error type for `frbr-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] frbr_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored value does not fit the declared column type.
  #[error("{table}.{column}: cannot decode stored value {value}")]
  Decode {
    table:  &'static str,
    column: &'static str,
    value:  String,
  },

  #[error("{table} row not found: {id}")]
  RecordNotFound { table: &'static str, id: i64 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
