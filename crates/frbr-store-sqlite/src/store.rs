//! [`SqliteStore`]: the SQLite implementation of [`CatalogStore`].

use std::path::Path;

use chrono::Utc;
use frbr_core::{
  entity::{Expression, Item, Manifestation, Work},
  kind::{AgentRef, EntityRef},
  link::{Aboutness, Creation},
  row::{Record, Row},
  schema::{CATALOG, LoadOutcome, REFERENCES, Reference, Schema, Table},
  store::CatalogStore,
  version::SchemaVersion,
  view::{
    DanglingReference, Defect, ExpressionView, ManifestationView, WorkView,
  },
};
use rusqlite::types::Value;

use crate::{
  Error, Result,
  encode::{RawRecord, row_params},
  introspect::{self, TableInfo},
  schema::{self, quote},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A catalogue store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and load the catalogue schema.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let store = Self::connect(path).await?;
    store.load_schema(&CATALOG).await?;
    Ok(store)
  }

  /// Open an in-memory store with the catalogue schema loaded.
  pub async fn open_in_memory() -> Result<Self> {
    let store = Self::connect_in_memory().await?;
    store.load_schema(&CATALOG).await?;
    Ok(store)
  }

  /// Open a database without touching its schema.
  pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Ok(Self { conn })
  }

  pub async fn connect_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Ok(Self { conn })
  }

  /// Introspect the tables physically present in the database.
  pub async fn describe(&self) -> Result<Vec<TableInfo>> {
    Ok(
      self
        .conn
        .call(|conn| Ok(introspect::describe(conn)?))
        .await?,
    )
  }

  /// Run `SELECT DISTINCT t.id, t.<columns...> FROM <table> t <tail>` and
  /// decode the rows as `R`.
  async fn select<R: Row>(&self, tail: String, params: Vec<Value>) -> Result<Vec<Record<R>>> {
    let table = R::TABLE;
    let sql = format!("{} {tail}", select_sql(table));
    let width = table.columns.len();

    let raws: Vec<RawRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), |row| {
            let values = (1..=width)
              .map(|i| row.get::<_, Value>(i))
              .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(RawRecord { id: row.get(0)?, values })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecord::into_record).collect()
  }
}

fn select_sql(table: &Table) -> String {
  let columns: String = table
    .columns
    .iter()
    .map(|c| format!(", t.{}", quote(c.name)))
    .collect();
  format!("SELECT DISTINCT t.\"id\"{columns} FROM {} t", quote(table.name))
}

/// Rows of `source` whose `column` names an id absent from `target`.
/// `filter` narrows the rows further and may bind `?1`.
fn missing_targets(
  conn: &rusqlite::Connection,
  source: &Table,
  column: &str,
  target: &Table,
  filter: &str,
  params: &[&dyn rusqlite::ToSql],
) -> rusqlite::Result<Vec<DanglingReference>> {
  let col = quote(column);
  let sql = format!(
    "SELECT t.\"id\", t.{col} FROM {} t
     WHERE t.{col} IS NOT NULL {filter}
       AND NOT EXISTS (SELECT 1 FROM {} x WHERE x.\"id\" = t.{col})
     ORDER BY t.\"id\"",
    quote(source.name),
    quote(target.name),
  );
  let mut stmt = conn.prepare(&sql)?;
  let found = stmt
    .query_map(params, |row| {
      Ok(DanglingReference {
        table:  source.name.to_owned(),
        row_id: row.get(0)?,
        column: column.to_owned(),
        defect: Defect::MissingTarget {
          table: target.name.to_owned(),
          id:    row.get(1)?,
        },
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(found)
}

/// Rows of `table` whose key columns are NULL. With a `type_column`, a row
/// with exactly one half of the pair set is incomplete; otherwise any NULL
/// is a missing key.
fn null_keys(
  conn: &rusqlite::Connection,
  table: &Table,
  id_column: &str,
  type_column: Option<&str>,
) -> rusqlite::Result<Vec<DanglingReference>> {
  let id = quote(id_column);
  let (both_null, any_null) = match type_column {
    Some(ty) => {
      let ty = quote(ty);
      (format!("t.{id} IS NULL AND t.{ty} IS NULL"), format!("t.{id} IS NULL OR t.{ty} IS NULL"))
    }
    None => (format!("t.{id} IS NULL"), format!("t.{id} IS NULL")),
  };
  let sql = format!(
    "SELECT t.\"id\", {both_null} FROM {} t WHERE {any_null} ORDER BY t.\"id\"",
    quote(table.name),
  );
  let mut stmt = conn.prepare(&sql)?;
  let found = stmt
    .query_map([], |row| {
      let defect = if row.get::<_, bool>(1)? {
        Defect::MissingKey
      } else {
        Defect::IncompleteReference
      };
      Ok(DanglingReference {
        table: table.name.to_owned(),
        row_id: row.get(0)?,
        column: id_column.to_owned(),
        defect,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(found)
}

/// Find values of one reference column that do not resolve.
fn audit(
  conn: &rusqlite::Connection,
  reference: Reference,
) -> rusqlite::Result<Vec<DanglingReference>> {
  match reference {
    Reference::Direct { table, column, target, required } => {
      let mut found = missing_targets(conn, table, column, target, "", &[])?;
      if required {
        found.extend(null_keys(conn, table, column, None)?);
      }
      Ok(found)
    }
    Reference::Polymorphic { table, id_column, type_column, accepts } => {
      let mut found = null_keys(conn, table, id_column, Some(type_column))?;
      let filter = format!("AND t.{} = ?1", quote(type_column));
      for kind in accepts.kinds() {
        let discriminator = kind.discriminator();
        found.extend(missing_targets(
          conn,
          table,
          id_column,
          kind.table(),
          &filter,
          &[&discriminator as &dyn rusqlite::ToSql],
        )?);
      }

      let sql = format!(
        "SELECT t.\"id\", t.{ty} FROM {} t WHERE t.{ty} IS NOT NULL ORDER BY t.\"id\"",
        quote(table.name),
        ty = quote(type_column),
      );
      let mut stmt = conn.prepare(&sql)?;
      let types = stmt
        .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
      found.extend(
        types
          .into_iter()
          .filter(|(_, value)| !accepts.accepts(value))
          .map(|(row_id, value)| DanglingReference {
            table: table.name.to_owned(),
            row_id,
            column: id_column.to_owned(),
            defect: Defect::UnknownType { value },
          }),
      );
      Ok(found)
    }
  }
}

// ─── CatalogStore impl ───────────────────────────────────────────────────────

impl CatalogStore for SqliteStore {
  type Error = Error;

  // ── Schema ────────────────────────────────────────────────────────────────

  async fn load_schema(&self, schema: &'static Schema) -> Result<LoadOutcome> {
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let outcome = schema::load(&tx, schema)?;
        tx.commit()?;
        Ok(outcome)
      })
      .await?;

    match outcome {
      LoadOutcome::Created { version } => {
        tracing::info!(%version, tables = schema.tables.len(), "schema created");
      }
      LoadOutcome::Upgraded { from, to } => {
        tracing::info!(%from, %to, tables = schema.tables.len(), "schema reloaded");
      }
      LoadOutcome::UpToDate { version } => {
        tracing::debug!(%version, "schema up to date");
      }
      LoadOutcome::Ahead { stored, defined } => {
        tracing::warn!(%stored, %defined, "database schema is newer than definition; not loading");
      }
    }
    Ok(outcome)
  }

  async fn schema_version(&self) -> Result<Option<SchemaVersion>> {
    Ok(self.conn.call(|conn| schema::stored_version(conn)).await?)
  }

  // ── Rows ──────────────────────────────────────────────────────────────────

  async fn insert<R: Row>(&self, row: R) -> Result<Record<R>> {
    let table = R::TABLE;
    let now = table.has_timestamps().then(Utc::now);
    let params = row_params(table, row.to_values(), now, now)?;

    let names: Vec<String> = params.iter().map(|(name, _)| quote(name)).collect();
    let holes: Vec<String> = (1..=params.len()).map(|i| format!("?{i}")).collect();
    let sql = format!(
      "INSERT INTO {} ({}) VALUES ({})",
      quote(table.name),
      names.join(", "),
      holes.join(", "),
    );
    let values: Vec<Value> = params.into_iter().map(|(_, v)| v).collect();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(&sql, rusqlite::params_from_iter(values))?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Record { id, created_at: now, updated_at: now, data: row })
  }

  async fn get<R: Row>(&self, id: i64) -> Result<Option<Record<R>>> {
    let records = self
      .select::<R>("WHERE t.\"id\" = ?1".to_owned(), vec![Value::Integer(id)])
      .await?;
    Ok(records.into_iter().next())
  }

  async fn list<R: Row>(&self) -> Result<Vec<Record<R>>> {
    self.select::<R>("ORDER BY t.\"id\"".to_owned(), vec![]).await
  }

  async fn update<R: Row>(&self, id: i64, row: R) -> Result<Record<R>> {
    let table = R::TABLE;
    let now = table.has_timestamps().then(Utc::now);
    let params = row_params(table, row.to_values(), None, now)?;

    let sets: Vec<String> = params
      .iter()
      .enumerate()
      .map(|(i, (name, _))| format!("{} = ?{}", quote(name), i + 1))
      .collect();
    let sql = format!(
      "UPDATE {} SET {} WHERE \"id\" = ?{}",
      quote(table.name),
      sets.join(", "),
      params.len() + 1,
    );
    let mut values: Vec<Value> = params.into_iter().map(|(_, v)| v).collect();
    values.push(Value::Integer(id));

    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute(&sql, rusqlite::params_from_iter(values))?))
      .await?;
    if changed == 0 {
      return Err(Error::RecordNotFound { table: table.name, id });
    }

    self
      .get::<R>(id)
      .await?
      .ok_or(Error::RecordNotFound { table: table.name, id })
  }

  async fn delete<R: Row>(&self, id: i64) -> Result<()> {
    let table = R::TABLE;
    let sql = format!("DELETE FROM {} WHERE \"id\" = ?1", quote(table.name));

    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute(&sql, [id])?))
      .await?;
    if changed == 0 {
      return Err(Error::RecordNotFound { table: table.name, id });
    }
    Ok(())
  }

  // ── FRBR chain ────────────────────────────────────────────────────────────

  async fn expressions_of_work(&self, work_id: i64) -> Result<Vec<Record<Expression>>> {
    self
      .select::<Expression>(
        "JOIN \"reifications\" r ON r.\"expression_id\" = t.\"id\"
         WHERE r.\"work_id\" = ?1 ORDER BY t.\"id\""
          .to_owned(),
        vec![Value::Integer(work_id)],
      )
      .await
  }

  async fn works_of_expression(&self, expression_id: i64) -> Result<Vec<Record<Work>>> {
    self
      .select::<Work>(
        "JOIN \"reifications\" r ON r.\"work_id\" = t.\"id\"
         WHERE r.\"expression_id\" = ?1 ORDER BY t.\"id\""
          .to_owned(),
        vec![Value::Integer(expression_id)],
      )
      .await
  }

  async fn manifestations_of_expression(
    &self,
    expression_id: i64,
  ) -> Result<Vec<Record<Manifestation>>> {
    self
      .select::<Manifestation>(
        "WHERE t.\"expression_id\" = ?1 ORDER BY t.\"id\"".to_owned(),
        vec![Value::Integer(expression_id)],
      )
      .await
  }

  async fn items_of_manifestation(&self, manifestation_id: i64) -> Result<Vec<Record<Item>>> {
    self
      .select::<Item>(
        "WHERE t.\"manifestation_id\" = ?1 ORDER BY t.\"id\"".to_owned(),
        vec![Value::Integer(manifestation_id)],
      )
      .await
  }

  // ── Polymorphic links ─────────────────────────────────────────────────────

  async fn creators_of_work(&self, work_id: i64) -> Result<Vec<AgentRef>> {
    let creations = self
      .select::<Creation>(
        "WHERE t.\"work_id\" = ?1 ORDER BY t.\"id\"".to_owned(),
        vec![Value::Integer(work_id)],
      )
      .await?;
    let mut creators: Vec<AgentRef> = Vec::with_capacity(creations.len());
    for c in creations {
      if !creators.contains(&c.data.creator) {
        creators.push(c.data.creator);
      }
    }
    Ok(creators)
  }

  async fn works_created_by(&self, agent: AgentRef) -> Result<Vec<Record<Work>>> {
    self
      .select::<Work>(
        "JOIN \"creations\" c ON c.\"work_id\" = t.\"id\"
         WHERE c.\"creator_type\" = ?1 AND c.\"creator_id\" = ?2
         ORDER BY t.\"id\""
          .to_owned(),
        vec![
          Value::Text(agent.kind().discriminator().to_owned()),
          Value::Integer(agent.id()),
        ],
      )
      .await
  }

  async fn subjects_of_work(&self, work_id: i64) -> Result<Vec<EntityRef>> {
    let aboutnesses = self
      .select::<Aboutness>(
        "WHERE t.\"work_id\" = ?1 ORDER BY t.\"id\"".to_owned(),
        vec![Value::Integer(work_id)],
      )
      .await?;
    let mut subjects: Vec<EntityRef> = Vec::with_capacity(aboutnesses.len());
    for a in aboutnesses {
      if !subjects.contains(&a.data.subject) {
        subjects.push(a.data.subject);
      }
    }
    Ok(subjects)
  }

  async fn works_about(&self, subject: EntityRef) -> Result<Vec<Record<Work>>> {
    self
      .select::<Work>(
        "JOIN \"aboutnesses\" a ON a.\"work_id\" = t.\"id\"
         WHERE a.\"subject_type\" = ?1 AND a.\"subject_id\" = ?2
         ORDER BY t.\"id\""
          .to_owned(),
        vec![
          Value::Text(subject.kind().discriminator().to_owned()),
          Value::Integer(subject.id()),
        ],
      )
      .await
  }

  // ── Views ─────────────────────────────────────────────────────────────────

  async fn materialize_work(&self, work_id: i64) -> Result<Option<WorkView>> {
    let work = match self.get::<Work>(work_id).await? {
      Some(w) => w,
      None => return Ok(None),
    };

    let creators = self.creators_of_work(work_id).await?;
    let subjects = self.subjects_of_work(work_id).await?;

    let mut expressions = Vec::new();
    for expression in self.expressions_of_work(work_id).await? {
      let mut manifestations = Vec::new();
      for manifestation in self.manifestations_of_expression(expression.id).await? {
        let items = self.items_of_manifestation(manifestation.id).await?;
        manifestations.push(ManifestationView { manifestation, items });
      }
      expressions.push(ExpressionView { expression, manifestations });
    }

    Ok(Some(WorkView { work, creators, subjects, expressions }))
  }

  async fn dangling_references(&self) -> Result<Vec<DanglingReference>> {
    let found = self
      .conn
      .call(|conn| {
        let mut found = Vec::new();
        for reference in REFERENCES {
          found.extend(audit(conn, *reference)?);
        }
        Ok(found)
      })
      .await?;

    if !found.is_empty() {
      tracing::warn!(count = found.len(), "dangling references");
    }
    Ok(found)
  }
}
