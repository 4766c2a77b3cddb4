//! Error types for `frbr-core`.

use thiserror::Error;

use crate::schema::ColumnType;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid schema version {0:?}: expected a YYYYMMDDHHMMSS timestamp")]
  InvalidVersion(String),

  #[error("unknown {column} discriminator: {value:?}")]
  UnknownDiscriminator { column: &'static str, value: String },

  /// Only one half of an `_id`/`_type` pair is populated.
  #[error("{table}.{column}: polymorphic reference is only partially set")]
  IncompleteReference { table: &'static str, column: &'static str },

  /// A link-table key the typed model requires is NULL.
  #[error("{table}.{column} is NULL")]
  MissingKey { table: &'static str, column: &'static str },

  #[error("{table}.{column}: expected a {expected} value")]
  ColumnMismatch {
    table:    &'static str,
    column:   &'static str,
    expected: ColumnType,
  },

  #[error("{table}: expected {expected} values, found {found}")]
  Arity {
    table:    &'static str,
    expected: usize,
    found:    usize,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
