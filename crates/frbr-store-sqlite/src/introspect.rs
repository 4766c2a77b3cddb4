//! Reading back the physical schema SQLite actually holds.

use frbr_core::schema::ColumnType;

use crate::schema::{column_type, quote};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
  pub name:          String,
  /// The type as declared in `CREATE TABLE`.
  pub declared_type: String,
  pub ty:            Option<ColumnType>,
  pub not_null:      bool,
  pub default:       Option<String>,
  pub primary_key:   bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
  pub name:         String,
  /// Columns in physical order, `id` included.
  pub columns:      Vec<ColumnInfo>,
  /// Tables referenced by declared foreign keys.
  pub foreign_keys: Vec<String>,
  pub indexes:      Vec<String>,
}

/// Every user table, in name order. SQLite's internal tables are skipped.
pub(crate) fn describe(conn: &rusqlite::Connection) -> rusqlite::Result<Vec<TableInfo>> {
  let mut stmt = conn.prepare(
    "SELECT name FROM sqlite_master
     WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
     ORDER BY name",
  )?;
  let names = stmt
    .query_map([], |row| row.get::<_, String>(0))?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  names
    .into_iter()
    .map(|name| describe_table(conn, name))
    .collect()
}

fn describe_table(conn: &rusqlite::Connection, name: String) -> rusqlite::Result<TableInfo> {
  let quoted = quote(&name);

  let mut stmt = conn.prepare(&format!("PRAGMA table_info({quoted})"))?;
  let columns = stmt
    .query_map([], |row| {
      let declared_type: String = row.get("type")?;
      Ok(ColumnInfo {
        name:        row.get("name")?,
        ty:          column_type(&declared_type),
        declared_type,
        not_null:    row.get::<_, i64>("notnull")? != 0,
        default:     row.get("dflt_value")?,
        primary_key: row.get::<_, i64>("pk")? != 0,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut stmt = conn.prepare(&format!("PRAGMA foreign_key_list({quoted})"))?;
  let foreign_keys = stmt
    .query_map([], |row| row.get::<_, String>("table"))?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut stmt = conn.prepare(&format!("PRAGMA index_list({quoted})"))?;
  let indexes = stmt
    .query_map([], |row| row.get::<_, String>("name"))?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  Ok(TableInfo { name, columns, foreign_keys, indexes })
}
