//! Link tables: FRBR relationships between entities.
//!
//! Five of the six links are polymorphic on one side: the agent (or
//! subject) column pair may point into any of several tables. Link rows
//! carry no timestamps. Nothing in the storage layer guarantees that the
//! referenced rows exist; see `CatalogStore::dangling_references`.

use serde::{Deserialize, Serialize};

use crate::{
  Result,
  kind::{AgentRef, EntityRef},
  row::{ColumnValue, Reader, Row, agent_values, entity_values},
  schema::{self, Table},
};

/// A work is about some subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aboutness {
  pub subject: EntityRef,
  pub work_id: i64,
}

impl Row for Aboutness {
  const TABLE: &'static Table = &schema::ABOUTNESSES;

  fn to_values(&self) -> Vec<ColumnValue> {
    let mut values = entity_values(self.subject).to_vec();
    values.push(self.work_id.into());
    values
  }

  fn from_values(values: Vec<ColumnValue>) -> Result<Self> {
    let mut r = Reader::new(Self::TABLE, values)?;
    Ok(Self { subject: r.entity()?, work_id: r.key()? })
  }
}

/// An agent created a work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creation {
  pub creator:  AgentRef,
  pub work_id:  i64,
  /// Role label, e.g. "author" or "composer".
  pub relation: Option<String>,
}

impl Row for Creation {
  const TABLE: &'static Table = &schema::CREATIONS;

  fn to_values(&self) -> Vec<ColumnValue> {
    let mut values = agent_values(self.creator).to_vec();
    values.extend([self.work_id.into(), (&self.relation).into()]);
    values
  }

  fn from_values(values: Vec<ColumnValue>) -> Result<Self> {
    let mut r = Reader::new(Self::TABLE, values)?;
    Ok(Self {
      creator:  r.agent()?,
      work_id:  r.key()?,
      relation: r.string()?,
    })
  }
}

/// An agent realised an expression (translator, performer, editor...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Realization {
  pub realizer:      AgentRef,
  pub expression_id: i64,
  pub relation:      Option<String>,
}

impl Row for Realization {
  const TABLE: &'static Table = &schema::REALIZATIONS;

  fn to_values(&self) -> Vec<ColumnValue> {
    let mut values = agent_values(self.realizer).to_vec();
    values.extend([self.expression_id.into(), (&self.relation).into()]);
    values
  }

  fn from_values(values: Vec<ColumnValue>) -> Result<Self> {
    let mut r = Reader::new(Self::TABLE, values)?;
    Ok(Self {
      realizer:      r.agent()?,
      expression_id: r.key()?,
      relation:      r.string()?,
    })
  }
}

/// An agent produced a manifestation (publisher, printer...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Production {
  pub producer:         AgentRef,
  pub manifestation_id: i64,
  pub relation:         Option<String>,
}

impl Row for Production {
  const TABLE: &'static Table = &schema::PRODUCTIONS;

  fn to_values(&self) -> Vec<ColumnValue> {
    let mut values = agent_values(self.producer).to_vec();
    values.extend([self.manifestation_id.into(), (&self.relation).into()]);
    values
  }

  fn from_values(values: Vec<ColumnValue>) -> Result<Self> {
    let mut r = Reader::new(Self::TABLE, values)?;
    Ok(Self {
      producer:         r.agent()?,
      manifestation_id: r.key()?,
      relation:         r.string()?,
    })
  }
}

/// An agent owns (or owned) an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownership {
  pub owner:    AgentRef,
  pub item_id:  i64,
  pub relation: Option<String>,
}

impl Row for Ownership {
  const TABLE: &'static Table = &schema::OWNERSHIPS;

  fn to_values(&self) -> Vec<ColumnValue> {
    let mut values = agent_values(self.owner).to_vec();
    values.extend([self.item_id.into(), (&self.relation).into()]);
    values
  }

  fn from_values(values: Vec<ColumnValue>) -> Result<Self> {
    let mut r = Reader::new(Self::TABLE, values)?;
    Ok(Self {
      owner:    r.agent()?,
      item_id:  r.key()?,
      relation: r.string()?,
    })
  }
}

/// A work is realised through an expression. The only direct link table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reification {
  pub work_id:       i64,
  pub expression_id: i64,
  pub relation:      Option<String>,
}

impl Row for Reification {
  const TABLE: &'static Table = &schema::REIFICATIONS;

  fn to_values(&self) -> Vec<ColumnValue> {
    vec![
      self.work_id.into(),
      self.expression_id.into(),
      (&self.relation).into(),
    ]
  }

  fn from_values(values: Vec<ColumnValue>) -> Result<Self> {
    let mut r = Reader::new(Self::TABLE, values)?;
    Ok(Self {
      work_id:       r.key()?,
      expression_id: r.key()?,
      relation:      r.string()?,
    })
  }
}
