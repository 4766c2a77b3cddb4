//! Typed polymorphic references.
//!
//! The link tables store a polymorphic foreign key as an `_id` integer plus
//! a `_type` string naming the referenced table's entity. Here that pair is
//! a closed enum, so the set of entities a link may point at is checked at
//! compile time. The discriminator strings are the entity names
//! (`"Person"`, `"CorporateBody"`, ...), which is what the application that
//! populates the catalogue writes.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator as _, IntoStaticStr};

use crate::{Error, Result, schema::{self, Table}};

// ─── Kinds ───────────────────────────────────────────────────────────────────

/// Every entity table of the catalogue.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
pub enum EntityKind {
  Work,
  Expression,
  Manifestation,
  Item,
  Person,
  CorporateBody,
  Family,
  Concept,
  Event,
  Place,
  FrbrObject,
}

impl EntityKind {
  /// The string written to `_type` columns.
  pub fn discriminator(self) -> &'static str { self.into() }

  pub fn table(self) -> &'static Table {
    match self {
      Self::Work => &schema::WORKS,
      Self::Expression => &schema::EXPRESSIONS,
      Self::Manifestation => &schema::MANIFESTATIONS,
      Self::Item => &schema::ITEMS,
      Self::Person => &schema::PEOPLE,
      Self::CorporateBody => &schema::CORPORATE_BODIES,
      Self::Family => &schema::FAMILIES,
      Self::Concept => &schema::CONCEPTS,
      Self::Event => &schema::EVENTS,
      Self::Place => &schema::PLACES,
      Self::FrbrObject => &schema::FRBR_OBJECTS,
    }
  }

  pub fn parse(column: &'static str, value: &str) -> Result<Self> {
    value.parse().map_err(|_| Error::UnknownDiscriminator {
      column,
      value: value.to_owned(),
    })
  }
}

/// Entities capable of creating, realising, producing, or owning.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
pub enum AgentKind {
  Person,
  CorporateBody,
  Family,
}

impl AgentKind {
  pub fn discriminator(self) -> &'static str { self.into() }

  pub fn table(self) -> &'static Table { EntityKind::from(self).table() }

  pub fn parse(column: &'static str, value: &str) -> Result<Self> {
    value.parse().map_err(|_| Error::UnknownDiscriminator {
      column,
      value: value.to_owned(),
    })
  }
}

impl From<AgentKind> for EntityKind {
  fn from(kind: AgentKind) -> Self {
    match kind {
      AgentKind::Person => Self::Person,
      AgentKind::CorporateBody => Self::CorporateBody,
      AgentKind::Family => Self::Family,
    }
  }
}

/// Which kinds a polymorphic column may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accepts {
  Agents,
  Entities,
}

impl Accepts {
  pub fn kinds(self) -> Vec<EntityKind> {
    match self {
      Self::Agents => AgentKind::iter().map(EntityKind::from).collect(),
      Self::Entities => EntityKind::iter().collect(),
    }
  }

  pub fn accepts(self, discriminator: &str) -> bool {
    match self {
      Self::Agents => discriminator.parse::<AgentKind>().is_ok(),
      Self::Entities => discriminator.parse::<EntityKind>().is_ok(),
    }
  }
}

// ─── References ──────────────────────────────────────────────────────────────

/// A creator, realiser, producer, or owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id")]
pub enum AgentRef {
  Person(i64),
  CorporateBody(i64),
  Family(i64),
}

impl AgentRef {
  pub fn new(kind: AgentKind, id: i64) -> Self {
    match kind {
      AgentKind::Person => Self::Person(id),
      AgentKind::CorporateBody => Self::CorporateBody(id),
      AgentKind::Family => Self::Family(id),
    }
  }

  pub fn kind(self) -> AgentKind {
    match self {
      Self::Person(_) => AgentKind::Person,
      Self::CorporateBody(_) => AgentKind::CorporateBody,
      Self::Family(_) => AgentKind::Family,
    }
  }

  pub fn id(self) -> i64 {
    match self {
      Self::Person(id) | Self::CorporateBody(id) | Self::Family(id) => id,
    }
  }
}

/// Anything a work can be about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id")]
pub enum EntityRef {
  Work(i64),
  Expression(i64),
  Manifestation(i64),
  Item(i64),
  Person(i64),
  CorporateBody(i64),
  Family(i64),
  Concept(i64),
  Event(i64),
  Place(i64),
  FrbrObject(i64),
}

impl EntityRef {
  pub fn new(kind: EntityKind, id: i64) -> Self {
    match kind {
      EntityKind::Work => Self::Work(id),
      EntityKind::Expression => Self::Expression(id),
      EntityKind::Manifestation => Self::Manifestation(id),
      EntityKind::Item => Self::Item(id),
      EntityKind::Person => Self::Person(id),
      EntityKind::CorporateBody => Self::CorporateBody(id),
      EntityKind::Family => Self::Family(id),
      EntityKind::Concept => Self::Concept(id),
      EntityKind::Event => Self::Event(id),
      EntityKind::Place => Self::Place(id),
      EntityKind::FrbrObject => Self::FrbrObject(id),
    }
  }

  pub fn kind(self) -> EntityKind {
    match self {
      Self::Work(_) => EntityKind::Work,
      Self::Expression(_) => EntityKind::Expression,
      Self::Manifestation(_) => EntityKind::Manifestation,
      Self::Item(_) => EntityKind::Item,
      Self::Person(_) => EntityKind::Person,
      Self::CorporateBody(_) => EntityKind::CorporateBody,
      Self::Family(_) => EntityKind::Family,
      Self::Concept(_) => EntityKind::Concept,
      Self::Event(_) => EntityKind::Event,
      Self::Place(_) => EntityKind::Place,
      Self::FrbrObject(_) => EntityKind::FrbrObject,
    }
  }

  pub fn id(self) -> i64 {
    match self {
      Self::Work(id)
      | Self::Expression(id)
      | Self::Manifestation(id)
      | Self::Item(id)
      | Self::Person(id)
      | Self::CorporateBody(id)
      | Self::Family(id)
      | Self::Concept(id)
      | Self::Event(id)
      | Self::Place(id)
      | Self::FrbrObject(id) => id,
    }
  }
}

impl From<AgentRef> for EntityRef {
  fn from(agent: AgentRef) -> Self {
    Self::new(agent.kind().into(), agent.id())
  }
}
