//! Plain-text output for the non-JSON commands.

use std::fmt::Write as _;

use frbr_core::{schema::LoadOutcome, version::SchemaVersion};
use frbr_store_sqlite::TableInfo;

pub fn outcome(outcome: &LoadOutcome) -> String {
  match outcome {
    LoadOutcome::Created { version } => format!("created schema {version}"),
    LoadOutcome::Upgraded { from, to } => format!("reloaded schema {from} -> {to}"),
    LoadOutcome::UpToDate { version } => format!("schema {version} already loaded"),
    LoadOutcome::Ahead { stored, defined } => {
      format!("database is at {stored}, newer than {defined}; nothing loaded")
    }
  }
}

pub fn status(defined: SchemaVersion, stored: Option<SchemaVersion>) -> String {
  let stored = stored.map_or_else(|| "none".to_owned(), |v| v.to_string());
  format!("defined: {defined}\nstored:  {stored}\n")
}

pub fn tables(tables: &[TableInfo]) -> String {
  let mut out = String::new();
  for table in tables {
    let _ = writeln!(out, "{}", table.name);
    let width = table.columns.iter().map(|c| c.name.len()).max().unwrap_or(0);
    for column in &table.columns {
      let mut flags = Vec::new();
      if column.primary_key {
        flags.push("primary key".to_owned());
      }
      if column.not_null {
        flags.push("not null".to_owned());
      }
      if let Some(default) = &column.default {
        flags.push(format!("default {default}"));
      }
      let _ = writeln!(
        out,
        "  {:width$}  {}{}{}",
        column.name,
        column.declared_type,
        if flags.is_empty() { "" } else { "  " },
        flags.join(", "),
      );
    }
    for index in &table.indexes {
      let _ = writeln!(out, "  index {index}");
    }
    for target in &table.foreign_keys {
      let _ = writeln!(out, "  references {target}");
    }
  }
  out
}
