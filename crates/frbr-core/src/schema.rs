//! The catalogue schema: seventeen tables, their typed columns, and the
//! version they are tagged with.
//!
//! This is a passive description. Backends turn it into physical storage
//! (see `frbr-store-sqlite`); nothing here talks to a database.
//!
//! Every table also has an implicit, auto-populated integer `id` primary key
//! that is not listed among its columns. All listed columns are nullable,
//! have no default, and carry no foreign-key, uniqueness, or index
//! constraints. Reference columns are described separately in
//! [`REFERENCES`] as metadata only.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{kind::Accepts, version::SchemaVersion};

/// Version tag of the catalogue definition.
pub const CATALOG_VERSION: SchemaVersion = SchemaVersion::new(20080829161616);

/// Name of the implicit primary-key column.
pub const ID_COLUMN: &str = "id";
pub const CREATED_AT: &str = "created_at";
pub const UPDATED_AT: &str = "updated_at";

// ─── Column types ────────────────────────────────────────────────────────────

/// The semantic type of a column.
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
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ColumnType {
  Integer,
  String,
  Datetime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Column {
  pub name: &'static str,
  pub ty:   ColumnType,
}

const fn integer(name: &'static str) -> Column {
  Column { name, ty: ColumnType::Integer }
}

const fn string(name: &'static str) -> Column {
  Column { name, ty: ColumnType::String }
}

const fn datetime(name: &'static str) -> Column {
  Column { name, ty: ColumnType::Datetime }
}

// ─── Tables ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Table {
  pub name:    &'static str,
  /// Declared columns in order, excluding the implicit `id`.
  pub columns: &'static [Column],
}

impl Table {
  pub fn column(&self, name: &str) -> Option<&'static Column> {
    let columns: &'static [Column] = self.columns;
    columns.iter().find(|c| c.name == name)
  }

  /// Whether rows carry `created_at`/`updated_at` stamps.
  pub fn has_timestamps(&self) -> bool {
    self.column(CREATED_AT).is_some() && self.column(UPDATED_AT).is_some()
  }

  /// The columns a row type supplies itself: everything except the
  /// timestamps, in declaration order.
  pub fn data_columns(&self) -> impl Iterator<Item = &'static Column> {
    let columns: &'static [Column] = self.columns;
    columns
      .iter()
      .filter(|c| c.name != CREATED_AT && c.name != UPDATED_AT)
  }
}

pub const ABOUTNESSES: Table = Table {
  name:    "aboutnesses",
  columns: &[
    integer("subject_id"),
    string("subject_type"),
    integer("work_id"),
  ],
};

pub const CONCEPTS: Table = Table {
  name:    "concepts",
  columns: &[
    datetime(CREATED_AT),
    datetime(UPDATED_AT),
    string("term"),
    string("comment"),
  ],
};

pub const CORPORATE_BODIES: Table = Table {
  name:    "corporate_bodies",
  columns: &[
    datetime(CREATED_AT),
    datetime(UPDATED_AT),
    string("name"),
    string("dates"),
    string("other_designation"),
    string("place"),
    string("comment"),
  ],
};

pub const CREATIONS: Table = Table {
  name:    "creations",
  columns: &[
    integer("creator_id"),
    string("creator_type"),
    integer("work_id"),
    string("relation"),
  ],
};

pub const EVENTS: Table = Table {
  name:    "events",
  columns: &[
    datetime(CREATED_AT),
    datetime(UPDATED_AT),
    string("term"),
    string("date"),
    string("comment"),
  ],
};

pub const EXPRESSIONS: Table = Table {
  name:    "expressions",
  columns: &[
    datetime(CREATED_AT),
    datetime(UPDATED_AT),
    string("title"),
    string("form"),
    string("date"),
    string("language"),
    string("comment"),
  ],
};

pub const FAMILIES: Table = Table {
  name:    "families",
  columns: &[
    datetime(CREATED_AT),
    datetime(UPDATED_AT),
    string("name"),
    string("family_type"),
    string("dates"),
    string("places"),
    string("history"),
    string("comment"),
  ],
};

pub const FRBR_OBJECTS: Table = Table {
  name:    "frbr_objects",
  columns: &[
    datetime(CREATED_AT),
    datetime(UPDATED_AT),
    string("term"),
    string("comment"),
  ],
};

pub const ITEMS: Table = Table {
  name:    "items",
  columns: &[
    datetime(CREATED_AT),
    datetime(UPDATED_AT),
    string("call_number"),
    string("identifier"),
    string("provenance"),
    string("comment"),
    integer("manifestation_id"),
  ],
};

pub const MANIFESTATIONS: Table = Table {
  name:    "manifestations",
  columns: &[
    datetime(CREATED_AT),
    datetime(UPDATED_AT),
    string("title"),
    string("statement_of_responsibility"),
    string("edition"),
    string("identifier"),
    string("form_of_carrier"),
    string("publisher"),
    string("publication_date"),
    string("publication_place"),
    string("series_statement"),
    string("comment"),
    integer("expression_id"),
  ],
};

pub const OWNERSHIPS: Table = Table {
  name:    "ownerships",
  columns: &[
    integer("owner_id"),
    string("owner_type"),
    integer("item_id"),
    string("relation"),
  ],
};

pub const PEOPLE: Table = Table {
  name:    "people",
  columns: &[
    datetime(CREATED_AT),
    datetime(UPDATED_AT),
    string("name"),
    string("dates"),
    string("title"),
    string("other_designation"),
    string("affiliation"),
    string("country"),
    string("comment"),
  ],
};

pub const PLACES: Table = Table {
  name:    "places",
  columns: &[
    datetime(CREATED_AT),
    datetime(UPDATED_AT),
    string("term"),
    string("comment"),
  ],
};

pub const PRODUCTIONS: Table = Table {
  name:    "productions",
  columns: &[
    integer("producer_id"),
    string("producer_type"),
    integer("manifestation_id"),
    string("relation"),
  ],
};

pub const REALIZATIONS: Table = Table {
  name:    "realizations",
  columns: &[
    integer("realizer_id"),
    string("realizer_type"),
    integer("expression_id"),
    string("relation"),
  ],
};

pub const REIFICATIONS: Table = Table {
  name:    "reifications",
  columns: &[
    integer("work_id"),
    integer("expression_id"),
    string("relation"),
  ],
};

pub const WORKS: Table = Table {
  name:    "works",
  columns: &[
    datetime(CREATED_AT),
    datetime(UPDATED_AT),
    string("title"),
    string("form"),
    string("date"),
    string("comment"),
  ],
};

// ─── Schema ──────────────────────────────────────────────────────────────────

/// A versioned set of tables that a backend materialises as a unit.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Schema {
  pub version: SchemaVersion,
  pub tables:  &'static [Table],
}

impl Schema {
  pub fn table(&self, name: &str) -> Option<&'static Table> {
    let tables: &'static [Table] = self.tables;
    tables.iter().find(|t| t.name == name)
  }
}

/// The full catalogue definition.
pub static CATALOG: Schema = Schema {
  version: CATALOG_VERSION,
  tables:  &[
    ABOUTNESSES,
    CONCEPTS,
    CORPORATE_BODIES,
    CREATIONS,
    EVENTS,
    EXPRESSIONS,
    FAMILIES,
    FRBR_OBJECTS,
    ITEMS,
    MANIFESTATIONS,
    OWNERSHIPS,
    PEOPLE,
    PLACES,
    PRODUCTIONS,
    REALIZATIONS,
    REIFICATIONS,
    WORKS,
  ],
};

/// Result of asking a backend to materialise a [`Schema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoadOutcome {
  /// No version was recorded; every table was created.
  Created { version: SchemaVersion },
  /// An older version was recorded; every table was recreated.
  Upgraded {
    from: SchemaVersion,
    to:   SchemaVersion,
  },
  /// The recorded version equals the definition's; nothing was done.
  UpToDate { version: SchemaVersion },
  /// A newer version is already recorded; nothing was done.
  Ahead {
    stored:  SchemaVersion,
    defined: SchemaVersion,
  },
}

impl LoadOutcome {
  /// What loading a schema of version `defined` does, given the highest
  /// version already recorded.
  pub fn decide(stored: Option<SchemaVersion>, defined: SchemaVersion) -> Self {
    match stored {
      None => Self::Created { version: defined },
      Some(stored) if stored < defined => Self::Upgraded { from: stored, to: defined },
      Some(stored) if stored == defined => Self::UpToDate { version: defined },
      Some(stored) => Self::Ahead { stored, defined },
    }
  }

  /// Whether any table was (re)created.
  pub fn changed(&self) -> bool {
    matches!(self, Self::Created { .. } | Self::Upgraded { .. })
  }
}

// ─── References ──────────────────────────────────────────────────────────────

/// A column (or `_id`/`_type` column pair) that points at rows of other
/// tables. Never materialised as a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
  /// A plain foreign-key column. `required` is set where the typed row
  /// model needs the key (link tables); entity keys may be NULL.
  Direct {
    table:    &'static Table,
    column:   &'static str,
    target:   &'static Table,
    required: bool,
  },
  /// An `_id`/`_type` pair. Always required: both halves must be set.
  Polymorphic {
    table:       &'static Table,
    id_column:   &'static str,
    type_column: &'static str,
    accepts:     Accepts,
  },
}

impl Reference {
  pub fn table(&self) -> &'static Table {
    match self {
      Self::Direct { table, .. } | Self::Polymorphic { table, .. } => table,
    }
  }

  /// The column holding the referenced row id.
  pub fn id_column(&self) -> &'static str {
    match self {
      Self::Direct { column, .. } => column,
      Self::Polymorphic { id_column, .. } => id_column,
    }
  }

  /// Whether a NULL key makes the row undecodable.
  pub fn required(&self) -> bool {
    match self {
      Self::Direct { required, .. } => *required,
      Self::Polymorphic { .. } => true,
    }
  }
}

pub static REFERENCES: &[Reference] = &[
  Reference::Polymorphic {
    table:       &ABOUTNESSES,
    id_column:   "subject_id",
    type_column: "subject_type",
    accepts:     Accepts::Entities,
  },
  Reference::Direct {
    table:    &ABOUTNESSES,
    column:   "work_id",
    target:   &WORKS,
    required: true,
  },
  Reference::Polymorphic {
    table:       &CREATIONS,
    id_column:   "creator_id",
    type_column: "creator_type",
    accepts:     Accepts::Agents,
  },
  Reference::Direct {
    table:    &CREATIONS,
    column:   "work_id",
    target:   &WORKS,
    required: true,
  },
  Reference::Direct {
    table:    &ITEMS,
    column:   "manifestation_id",
    target:   &MANIFESTATIONS,
    required: false,
  },
  Reference::Direct {
    table:    &MANIFESTATIONS,
    column:   "expression_id",
    target:   &EXPRESSIONS,
    required: false,
  },
  Reference::Polymorphic {
    table:       &OWNERSHIPS,
    id_column:   "owner_id",
    type_column: "owner_type",
    accepts:     Accepts::Agents,
  },
  Reference::Direct {
    table:    &OWNERSHIPS,
    column:   "item_id",
    target:   &ITEMS,
    required: true,
  },
  Reference::Polymorphic {
    table:       &PRODUCTIONS,
    id_column:   "producer_id",
    type_column: "producer_type",
    accepts:     Accepts::Agents,
  },
  Reference::Direct {
    table:    &PRODUCTIONS,
    column:   "manifestation_id",
    target:   &MANIFESTATIONS,
    required: true,
  },
  Reference::Polymorphic {
    table:       &REALIZATIONS,
    id_column:   "realizer_id",
    type_column: "realizer_type",
    accepts:     Accepts::Agents,
  },
  Reference::Direct {
    table:    &REALIZATIONS,
    column:   "expression_id",
    target:   &EXPRESSIONS,
    required: true,
  },
  Reference::Direct {
    table:    &REIFICATIONS,
    column:   "work_id",
    target:   &WORKS,
    required: true,
  },
  Reference::Direct {
    table:    &REIFICATIONS,
    column:   "expression_id",
    target:   &EXPRESSIONS,
    required: true,
  },
];
