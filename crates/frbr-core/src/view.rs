//! Computed read models. Never stored; always derived from the tables.

use serde::{Deserialize, Serialize};

use crate::{
  entity::{Expression, Item, Manifestation, Work},
  kind::{AgentRef, EntityRef},
  row::Record,
};

// ─── Work tree ───────────────────────────────────────────────────────────────

/// A work with everything hanging off it along the FRBR chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkView {
  pub work:        Record<Work>,
  pub creators:    Vec<AgentRef>,
  pub subjects:    Vec<EntityRef>,
  /// Expressions reached through `reifications`, in id order.
  pub expressions: Vec<ExpressionView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpressionView {
  pub expression:     Record<Expression>,
  pub manifestations: Vec<ManifestationView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestationView {
  pub manifestation: Record<Manifestation>,
  pub items:         Vec<Record<Item>>,
}

impl WorkView {
  /// Ids of every item reachable from the work.
  pub fn item_ids(&self) -> Vec<i64> {
    self
      .expressions
      .iter()
      .flat_map(|e| &e.manifestations)
      .flat_map(|m| &m.items)
      .map(|i| i.id)
      .collect()
  }
}

// ─── Integrity ───────────────────────────────────────────────────────────────

/// A reference column whose value does not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DanglingReference {
  pub table:  String,
  pub row_id: i64,
  /// The `_id` column holding the reference.
  pub column: String,
  pub defect: Defect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "defect", rename_all = "snake_case")]
pub enum Defect {
  /// No row with this id exists in the target table.
  MissingTarget { table: String, id: i64 },
  /// The `_type` column names something the column may not reference.
  UnknownType { value: String },
  /// A key the row needs is NULL.
  MissingKey,
  /// Only one half of an `_id`/`_type` pair is set.
  IncompleteReference,
}

impl std::fmt::Display for DanglingReference {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}#{}.{}: ", self.table, self.row_id, self.column)?;
    match &self.defect {
      Defect::MissingTarget { table, id } => write!(f, "no {table} row with id {id}"),
      Defect::UnknownType { value } => write!(f, "unknown type {value:?}"),
      Defect::MissingKey => write!(f, "key is NULL"),
      Defect::IncompleteReference => write!(f, "only one of id and type is set"),
    }
  }
}
