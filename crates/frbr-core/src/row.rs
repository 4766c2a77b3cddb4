//! Mapping between Rust row types and table columns.
//!
//! A [`Row`] encodes itself as one [`ColumnValue`] per data column of its
//! table, in declaration order, and decodes from the same shape. Backends
//! only ever see `ColumnValue`s, so they can store any row generically.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  kind::{AgentKind, AgentRef, EntityKind, EntityRef},
  schema::{Column, ColumnType, Table},
};

// ─── Cells ───────────────────────────────────────────────────────────────────

/// A single nullable, typed cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ColumnValue {
  Integer(Option<i64>),
  String(Option<String>),
  Datetime(Option<DateTime<Utc>>),
}

impl ColumnValue {
  pub fn ty(&self) -> ColumnType {
    match self {
      Self::Integer(_) => ColumnType::Integer,
      Self::String(_) => ColumnType::String,
      Self::Datetime(_) => ColumnType::Datetime,
    }
  }

  pub fn is_null(&self) -> bool {
    match self {
      Self::Integer(v) => v.is_none(),
      Self::String(v) => v.is_none(),
      Self::Datetime(v) => v.is_none(),
    }
  }

  /// The NULL value of a given column type.
  pub fn null(ty: ColumnType) -> Self {
    match ty {
      ColumnType::Integer => Self::Integer(None),
      ColumnType::String => Self::String(None),
      ColumnType::Datetime => Self::Datetime(None),
    }
  }
}

impl From<Option<i64>> for ColumnValue {
  fn from(v: Option<i64>) -> Self { Self::Integer(v) }
}

impl From<i64> for ColumnValue {
  fn from(v: i64) -> Self { Self::Integer(Some(v)) }
}

impl From<Option<String>> for ColumnValue {
  fn from(v: Option<String>) -> Self { Self::String(v) }
}

impl From<&Option<String>> for ColumnValue {
  fn from(v: &Option<String>) -> Self { Self::String(v.clone()) }
}

impl From<&str> for ColumnValue {
  fn from(v: &str) -> Self { Self::String(Some(v.to_owned())) }
}

// ─── Row trait ───────────────────────────────────────────────────────────────

/// A Rust type stored as one row of a catalogue table.
pub trait Row: Sized + Clone + Send + Sync + 'static {
  const TABLE: &'static Table;

  /// One value per [`Table::data_columns`] entry, in order.
  fn to_values(&self) -> Vec<ColumnValue>;

  /// Inverse of [`Row::to_values`].
  fn from_values(values: Vec<ColumnValue>) -> Result<Self>;
}

/// A persisted row.
///
/// Timestamps are `None` for tables without `created_at`/`updated_at`, and
/// may be `None` for rows written by another application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record<R> {
  pub id:         i64,
  pub created_at: Option<DateTime<Utc>>,
  pub updated_at: Option<DateTime<Utc>>,
  #[serde(flatten)]
  pub data:       R,
}

// ─── Encoding helpers ────────────────────────────────────────────────────────

pub(crate) fn agent_values(agent: AgentRef) -> [ColumnValue; 2] {
  [agent.id().into(), agent.kind().discriminator().into()]
}

pub(crate) fn entity_values(entity: EntityRef) -> [ColumnValue; 2] {
  [entity.id().into(), entity.kind().discriminator().into()]
}

// ─── Decoding ────────────────────────────────────────────────────────────────

/// Reads a row's values column by column, checking each against the table
/// definition.
pub(crate) struct Reader {
  table:   &'static Table,
  columns: Vec<&'static Column>,
  values:  std::iter::Zip<
    std::vec::IntoIter<&'static Column>,
    std::vec::IntoIter<ColumnValue>,
  >,
}

impl Reader {
  pub(crate) fn new(table: &'static Table, values: Vec<ColumnValue>) -> Result<Self> {
    let columns: Vec<_> = table.data_columns().collect();
    if columns.len() != values.len() {
      return Err(Error::Arity {
        table:    table.name,
        expected: columns.len(),
        found:    values.len(),
      });
    }
    let values = columns.clone().into_iter().zip(values);
    Ok(Self { table, columns, values })
  }

  fn next(&mut self) -> Result<(&'static Column, ColumnValue)> {
    self.values.next().ok_or(Error::Arity {
      table:    self.table.name,
      expected: self.columns.len(),
      found:    self.columns.len() + 1,
    })
  }

  fn mismatch(&self, column: &'static Column) -> Error {
    Error::ColumnMismatch {
      table:    self.table.name,
      column:   column.name,
      expected: column.ty,
    }
  }

  pub(crate) fn string(&mut self) -> Result<Option<String>> {
    match self.next()? {
      (c, ColumnValue::String(v)) if c.ty == ColumnType::String => Ok(v),
      (c, _) => Err(self.mismatch(c)),
    }
  }

  pub(crate) fn integer(&mut self) -> Result<Option<i64>> {
    match self.next()? {
      (c, ColumnValue::Integer(v)) if c.ty == ColumnType::Integer => Ok(v),
      (c, _) => Err(self.mismatch(c)),
    }
  }

  /// A non-NULL integer, as required for link-table keys.
  pub(crate) fn key(&mut self) -> Result<i64> {
    let column = self.peek_name();
    self.integer()?.ok_or(Error::MissingKey { table: self.table.name, column })
  }

  fn peek_name(&self) -> &'static str {
    let consumed = self.columns.len() - self.values.len();
    self.columns.get(consumed).map_or("?", |c| c.name)
  }

  /// An `_id`/`_type` pair. Both halves must be set.
  fn pair(&mut self) -> Result<(&'static str, i64, String)> {
    let id_column = self.peek_name();
    let id = self.integer()?;
    let type_column = self.peek_name();
    let ty = self.string()?;
    match (id, ty) {
      (Some(id), Some(ty)) => Ok((type_column, id, ty)),
      (None, None) => Err(Error::MissingKey { table: self.table.name, column: id_column }),
      _ => Err(Error::IncompleteReference { table: self.table.name, column: id_column }),
    }
  }

  pub(crate) fn agent(&mut self) -> Result<AgentRef> {
    let (column, id, ty) = self.pair()?;
    Ok(AgentRef::new(AgentKind::parse(column, &ty)?, id))
  }

  pub(crate) fn entity(&mut self) -> Result<EntityRef> {
    let (column, id, ty) = self.pair()?;
    Ok(EntityRef::new(EntityKind::parse(column, &ty)?, id))
  }
}
