//! Conversion between [`ColumnValue`]s and SQLite values.
//!
//! Timestamps are written as RFC 3339 strings. On read, the
//! `YYYY-MM-DD HH:MM:SS[.ffffff]` form other writers of the same tables use
//! is also accepted and taken as UTC.

use chrono::{DateTime, NaiveDateTime, Utc};
use frbr_core::{
  row::{ColumnValue, Record, Row},
  schema::{CREATED_AT, ColumnType, Table, UPDATED_AT},
};
use rusqlite::types::Value;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Ok(dt.with_timezone(&Utc));
  }
  NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
    .map(|naive| naive.and_utc())
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Cells ───────────────────────────────────────────────────────────────────

pub fn to_sql(value: ColumnValue) -> Value {
  match value {
    ColumnValue::Integer(Some(i)) => Value::Integer(i),
    ColumnValue::String(Some(s)) => Value::Text(s),
    ColumnValue::Datetime(Some(dt)) => Value::Text(encode_dt(dt)),
    ColumnValue::Integer(None)
    | ColumnValue::String(None)
    | ColumnValue::Datetime(None) => Value::Null,
  }
}

fn describe(value: &Value) -> String {
  match value {
    Value::Null => "NULL".to_owned(),
    Value::Integer(i) => i.to_string(),
    Value::Real(f) => f.to_string(),
    Value::Text(s) => format!("{s:?}"),
    Value::Blob(b) => format!("<{} byte blob>", b.len()),
  }
}

pub fn from_sql(
  table: &'static Table,
  column: &'static str,
  ty: ColumnType,
  value: Value,
) -> Result<ColumnValue> {
  let decoded = match (ty, value) {
    (ty, Value::Null) => ColumnValue::null(ty),
    (ColumnType::Integer, Value::Integer(i)) => ColumnValue::Integer(Some(i)),
    (ColumnType::String, Value::Text(s)) => ColumnValue::String(Some(s)),
    // Numeric-looking text can come back as a number from a varchar column.
    (ColumnType::String, Value::Integer(i)) => ColumnValue::String(Some(i.to_string())),
    (ColumnType::Datetime, Value::Text(s)) => ColumnValue::Datetime(Some(decode_dt(&s)?)),
    (_, other) => {
      return Err(Error::Decode {
        table: table.name,
        column,
        value: describe(&other),
      });
    }
  };
  Ok(decoded)
}

/// Parameters for an INSERT or UPDATE of `table`, paired with their column
/// names, in declaration order.
///
/// Timestamp columns are included only when a stamp is supplied for them.
pub fn row_params(
  table: &'static Table,
  data: Vec<ColumnValue>,
  created_at: Option<DateTime<Utc>>,
  updated_at: Option<DateTime<Utc>>,
) -> Result<Vec<(&'static str, Value)>> {
  let expected = table.data_columns().count();
  if data.len() != expected {
    return Err(
      frbr_core::Error::Arity {
        table: table.name,
        expected,
        found: data.len(),
      }
      .into(),
    );
  }

  let mut data = data.into_iter();
  let mut params = Vec::with_capacity(table.columns.len());
  for column in table.columns {
    let stamp = match column.name {
      CREATED_AT => Some(created_at),
      UPDATED_AT => Some(updated_at),
      _ => None,
    };
    match stamp {
      Some(Some(at)) => params.push((column.name, Value::Text(encode_dt(at)))),
      Some(None) => {}
      None => {
        let value = data.next().ok_or(frbr_core::Error::Arity {
          table: table.name,
          expected,
          found: expected + 1,
        })?;
        if value.ty() != column.ty {
          return Err(
            frbr_core::Error::ColumnMismatch {
              table:    table.name,
              column:   column.name,
              expected: column.ty,
            }
            .into(),
          );
        }
        params.push((column.name, to_sql(value)));
      }
    }
  }
  Ok(params)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read from a row: the `id`, then every declared column in order.
pub struct RawRecord {
  pub id:     i64,
  pub values: Vec<Value>,
}

impl RawRecord {
  pub fn into_record<R: Row>(self) -> Result<Record<R>> {
    let table = R::TABLE;
    let mut created_at = None;
    let mut updated_at = None;
    let mut data = Vec::with_capacity(self.values.len());

    for (column, value) in table.columns.iter().zip(self.values) {
      let decoded = from_sql(table, column.name, column.ty, value)?;
      match (column.name, decoded) {
        (CREATED_AT, ColumnValue::Datetime(at)) => created_at = at,
        (UPDATED_AT, ColumnValue::Datetime(at)) => updated_at = at,
        (_, v) => data.push(v),
      }
    }

    Ok(Record {
      id: self.id,
      created_at,
      updated_at,
      data: R::from_values(data)?,
    })
  }
}
