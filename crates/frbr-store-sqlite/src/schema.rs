//! SQL generation and versioned loading for a [`Schema`].
//!
//! Loading drops and recreates every table of the schema, then records the
//! schema's version in `schema_migrations`. It only happens when the stored
//! version is older than the definition (or absent); see
//! [`LoadOutcome::decide`]. The whole load runs in one transaction.
//!
//! Generated tables contain exactly the declared columns plus an
//! auto-incrementing `id`. No foreign keys, unique constraints, indexes,
//! defaults, or NOT NULL are emitted for declared columns.

use frbr_core::{
  schema::{Column, ColumnType, ID_COLUMN, LoadOutcome, Schema, Table},
  version::SchemaVersion,
};
use rusqlite::OptionalExtension as _;

/// Table recording every schema version that has been loaded.
pub const MIGRATIONS_TABLE: &str = "schema_migrations";

const MIGRATIONS_DDL: &str = "
CREATE TABLE IF NOT EXISTS schema_migrations (
    version varchar(255) NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS unique_schema_migrations
    ON schema_migrations (version);
";

// ─── DDL ─────────────────────────────────────────────────────────────────────

pub fn sql_type(ty: ColumnType) -> &'static str {
  match ty {
    ColumnType::Integer => "integer",
    ColumnType::String => "varchar(255)",
    ColumnType::Datetime => "datetime",
  }
}

/// Map a declared SQLite column type back to a [`ColumnType`].
pub fn column_type(declared: &str) -> Option<ColumnType> {
  let declared = declared.trim().to_ascii_lowercase();
  match declared.as_str() {
    "integer" => Some(ColumnType::Integer),
    "datetime" => Some(ColumnType::Datetime),
    d if d.starts_with("varchar") => Some(ColumnType::String),
    _ => None,
  }
}

pub(crate) fn quote(ident: &str) -> String {
  format!("\"{}\"", ident.replace('"', "\"\""))
}

fn column_sql(column: &Column) -> String {
  format!("{} {}", quote(column.name), sql_type(column.ty))
}

pub fn create_table_sql(table: &Table) -> String {
  let mut defs = vec![format!(
    "{} INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL",
    quote(ID_COLUMN)
  )];
  defs.extend(table.columns.iter().map(column_sql));
  format!("CREATE TABLE {} ({})", quote(table.name), defs.join(", "))
}

pub fn drop_table_sql(table: &Table) -> String {
  format!("DROP TABLE IF EXISTS {}", quote(table.name))
}

/// The full script a load executes, for display. Statements end with `;`.
pub fn ddl(schema: &Schema) -> String {
  let mut out = String::from(MIGRATIONS_DDL.trim_start());
  for table in schema.tables {
    out.push('\n');
    out.push_str(&drop_table_sql(table));
    out.push_str(";\n");
    out.push_str(&create_table_sql(table));
    out.push_str(";\n");
  }
  out.push_str(&format!(
    "\nINSERT INTO {MIGRATIONS_TABLE} (version) VALUES ('{}');\n",
    schema.version
  ));
  out
}

// ─── Versioned load ──────────────────────────────────────────────────────────

/// Highest version in `schema_migrations`; `None` if the table is missing
/// or empty.
pub(crate) fn stored_version(
  conn: &rusqlite::Connection,
) -> tokio_rusqlite::Result<Option<SchemaVersion>> {
  let exists = conn
    .query_row(
      "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
      [MIGRATIONS_TABLE],
      |_| Ok(()),
    )
    .optional()?
    .is_some();
  if !exists {
    return Ok(None);
  }

  let mut stmt = conn.prepare("SELECT version FROM schema_migrations")?;
  let raw = stmt
    .query_map([], |row| row.get::<_, String>(0))?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut max = None;
  for s in raw {
    let version: SchemaVersion = s
      .parse()
      .map_err(|e: frbr_core::Error| tokio_rusqlite::Error::Other(Box::new(e)))?;
    max = max.max(Some(version));
  }
  Ok(max)
}

/// Load `schema` if the stored version is older. Must run inside a
/// transaction supplied by the caller.
pub(crate) fn load(
  conn: &rusqlite::Connection,
  schema: &Schema,
) -> tokio_rusqlite::Result<LoadOutcome> {
  conn.execute_batch(MIGRATIONS_DDL)?;
  let outcome = LoadOutcome::decide(stored_version(conn)?, schema.version);
  if !outcome.changed() {
    return Ok(outcome);
  }

  for table in schema.tables {
    conn.execute(&drop_table_sql(table), [])?;
    conn.execute(&create_table_sql(table), [])?;
  }
  conn.execute(
    "INSERT INTO schema_migrations (version) VALUES (?1)",
    [schema.version.to_string()],
  )?;
  Ok(outcome)
}
