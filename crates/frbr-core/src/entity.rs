//! Descriptive entities: the FRBR group 1 resources (work, expression,
//! manifestation, item), the agents, and the subject vocabularies.
//!
//! Every descriptive column is a nullable string. Dates are free text
//! ("c. 1850", "1922-1939") exactly as catalogued, not parsed values.

use serde::{Deserialize, Serialize};

use crate::{
  Result,
  row::{ColumnValue, Reader, Row},
  schema::{self, Table},
};

// ─── FRBR group 1 ───────────────────────────────────────────────────────────

/// An abstract intellectual or artistic creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Work {
  pub title:   Option<String>,
  pub form:    Option<String>,
  pub date:    Option<String>,
  pub comment: Option<String>,
}

impl Row for Work {
  const TABLE: &'static Table = &schema::WORKS;

  fn to_values(&self) -> Vec<ColumnValue> {
    vec![
      (&self.title).into(),
      (&self.form).into(),
      (&self.date).into(),
      (&self.comment).into(),
    ]
  }

  fn from_values(values: Vec<ColumnValue>) -> Result<Self> {
    let mut r = Reader::new(Self::TABLE, values)?;
    Ok(Self {
      title:   r.string()?,
      form:    r.string()?,
      date:    r.string()?,
      comment: r.string()?,
    })
  }
}

/// A realisation of a work in some notation, language, or performance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expression {
  pub title:    Option<String>,
  pub form:     Option<String>,
  pub date:     Option<String>,
  pub language: Option<String>,
  pub comment:  Option<String>,
}

impl Row for Expression {
  const TABLE: &'static Table = &schema::EXPRESSIONS;

  fn to_values(&self) -> Vec<ColumnValue> {
    vec![
      (&self.title).into(),
      (&self.form).into(),
      (&self.date).into(),
      (&self.language).into(),
      (&self.comment).into(),
    ]
  }

  fn from_values(values: Vec<ColumnValue>) -> Result<Self> {
    let mut r = Reader::new(Self::TABLE, values)?;
    Ok(Self {
      title:    r.string()?,
      form:     r.string()?,
      date:     r.string()?,
      language: r.string()?,
      comment:  r.string()?,
    })
  }
}

/// The physical embodiment of an expression: an edition, a pressing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifestation {
  pub title:                       Option<String>,
  pub statement_of_responsibility: Option<String>,
  pub edition:                     Option<String>,
  pub identifier:                  Option<String>,
  pub form_of_carrier:             Option<String>,
  pub publisher:                   Option<String>,
  pub publication_date:            Option<String>,
  pub publication_place:           Option<String>,
  pub series_statement:            Option<String>,
  pub comment:                     Option<String>,
  /// The embodied expression.
  pub expression_id:               Option<i64>,
}

impl Row for Manifestation {
  const TABLE: &'static Table = &schema::MANIFESTATIONS;

  fn to_values(&self) -> Vec<ColumnValue> {
    vec![
      (&self.title).into(),
      (&self.statement_of_responsibility).into(),
      (&self.edition).into(),
      (&self.identifier).into(),
      (&self.form_of_carrier).into(),
      (&self.publisher).into(),
      (&self.publication_date).into(),
      (&self.publication_place).into(),
      (&self.series_statement).into(),
      (&self.comment).into(),
      self.expression_id.into(),
    ]
  }

  fn from_values(values: Vec<ColumnValue>) -> Result<Self> {
    let mut r = Reader::new(Self::TABLE, values)?;
    Ok(Self {
      title:                       r.string()?,
      statement_of_responsibility: r.string()?,
      edition:                     r.string()?,
      identifier:                  r.string()?,
      form_of_carrier:             r.string()?,
      publisher:                   r.string()?,
      publication_date:            r.string()?,
      publication_place:           r.string()?,
      series_statement:            r.string()?,
      comment:                     r.string()?,
      expression_id:               r.integer()?,
    })
  }
}

/// A single exemplar of a manifestation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
  pub call_number:      Option<String>,
  pub identifier:       Option<String>,
  pub provenance:       Option<String>,
  pub comment:          Option<String>,
  /// The manifestation this is a copy of.
  pub manifestation_id: Option<i64>,
}

impl Row for Item {
  const TABLE: &'static Table = &schema::ITEMS;

  fn to_values(&self) -> Vec<ColumnValue> {
    vec![
      (&self.call_number).into(),
      (&self.identifier).into(),
      (&self.provenance).into(),
      (&self.comment).into(),
      self.manifestation_id.into(),
    ]
  }

  fn from_values(values: Vec<ColumnValue>) -> Result<Self> {
    let mut r = Reader::new(Self::TABLE, values)?;
    Ok(Self {
      call_number:      r.string()?,
      identifier:       r.string()?,
      provenance:       r.string()?,
      comment:          r.string()?,
      manifestation_id: r.integer()?,
    })
  }
}

// ─── Agents ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
  pub name:              Option<String>,
  pub dates:             Option<String>,
  pub title:             Option<String>,
  pub other_designation: Option<String>,
  pub affiliation:       Option<String>,
  pub country:           Option<String>,
  pub comment:           Option<String>,
}

impl Row for Person {
  const TABLE: &'static Table = &schema::PEOPLE;

  fn to_values(&self) -> Vec<ColumnValue> {
    vec![
      (&self.name).into(),
      (&self.dates).into(),
      (&self.title).into(),
      (&self.other_designation).into(),
      (&self.affiliation).into(),
      (&self.country).into(),
      (&self.comment).into(),
    ]
  }

  fn from_values(values: Vec<ColumnValue>) -> Result<Self> {
    let mut r = Reader::new(Self::TABLE, values)?;
    Ok(Self {
      name:              r.string()?,
      dates:             r.string()?,
      title:             r.string()?,
      other_designation: r.string()?,
      affiliation:       r.string()?,
      country:           r.string()?,
      comment:           r.string()?,
    })
  }
}

/// An organisation or group acting as a unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorporateBody {
  pub name:              Option<String>,
  pub dates:             Option<String>,
  pub other_designation: Option<String>,
  pub place:             Option<String>,
  pub comment:           Option<String>,
}

impl Row for CorporateBody {
  const TABLE: &'static Table = &schema::CORPORATE_BODIES;

  fn to_values(&self) -> Vec<ColumnValue> {
    vec![
      (&self.name).into(),
      (&self.dates).into(),
      (&self.other_designation).into(),
      (&self.place).into(),
      (&self.comment).into(),
    ]
  }

  fn from_values(values: Vec<ColumnValue>) -> Result<Self> {
    let mut r = Reader::new(Self::TABLE, values)?;
    Ok(Self {
      name:              r.string()?,
      dates:             r.string()?,
      other_designation: r.string()?,
      place:             r.string()?,
      comment:           r.string()?,
    })
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Family {
  pub name:        Option<String>,
  pub family_type: Option<String>,
  pub dates:       Option<String>,
  pub places:      Option<String>,
  pub history:     Option<String>,
  pub comment:     Option<String>,
}

impl Row for Family {
  const TABLE: &'static Table = &schema::FAMILIES;

  fn to_values(&self) -> Vec<ColumnValue> {
    vec![
      (&self.name).into(),
      (&self.family_type).into(),
      (&self.dates).into(),
      (&self.places).into(),
      (&self.history).into(),
      (&self.comment).into(),
    ]
  }

  fn from_values(values: Vec<ColumnValue>) -> Result<Self> {
    let mut r = Reader::new(Self::TABLE, values)?;
    Ok(Self {
      name:        r.string()?,
      family_type: r.string()?,
      dates:       r.string()?,
      places:      r.string()?,
      history:     r.string()?,
      comment:     r.string()?,
    })
  }
}

// ─── Subjects ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
  pub term:    Option<String>,
  pub comment: Option<String>,
}

impl Row for Concept {
  const TABLE: &'static Table = &schema::CONCEPTS;

  fn to_values(&self) -> Vec<ColumnValue> {
    vec![
      (&self.term).into(),
      (&self.comment).into(),
    ]
  }

  fn from_values(values: Vec<ColumnValue>) -> Result<Self> {
    let mut r = Reader::new(Self::TABLE, values)?;
    Ok(Self {
      term:    r.string()?,
      comment: r.string()?,
    })
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
  pub term:    Option<String>,
  pub date:    Option<String>,
  pub comment: Option<String>,
}

impl Row for Event {
  const TABLE: &'static Table = &schema::EVENTS;

  fn to_values(&self) -> Vec<ColumnValue> {
    vec![
      (&self.term).into(),
      (&self.date).into(),
      (&self.comment).into(),
    ]
  }

  fn from_values(values: Vec<ColumnValue>) -> Result<Self> {
    let mut r = Reader::new(Self::TABLE, values)?;
    Ok(Self {
      term:    r.string()?,
      date:    r.string()?,
      comment: r.string()?,
    })
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
  pub term:    Option<String>,
  pub comment: Option<String>,
}

impl Row for Place {
  const TABLE: &'static Table = &schema::PLACES;

  fn to_values(&self) -> Vec<ColumnValue> {
    vec![
      (&self.term).into(),
      (&self.comment).into(),
    ]
  }

  fn from_values(values: Vec<ColumnValue>) -> Result<Self> {
    let mut r = Reader::new(Self::TABLE, values)?;
    Ok(Self {
      term:    r.string()?,
      comment: r.string()?,
    })
  }
}

/// A generic catalogue object described by a term.
///
/// The table shares the shape of the vocabulary tables and has no
/// distinguishing role of its own; it is carried as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrbrObject {
  pub term:    Option<String>,
  pub comment: Option<String>,
}

impl Row for FrbrObject {
  const TABLE: &'static Table = &schema::FRBR_OBJECTS;

  fn to_values(&self) -> Vec<ColumnValue> {
    vec![
      (&self.term).into(),
      (&self.comment).into(),
    ]
  }

  fn from_values(values: Vec<ColumnValue>) -> Result<Self> {
    let mut r = Reader::new(Self::TABLE, values)?;
    Ok(Self {
      term:    r.string()?,
      comment: r.string()?,
    })
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn manifestation_values_follow_column_order() {
    let m = Manifestation {
      title: Some("Leaves of Grass".into()),
      publisher: Some("Fowler & Wells".into()),
      expression_id: Some(3),
      ..Default::default()
    };
    let values = m.to_values();
    let columns: Vec<_> = Manifestation::TABLE.data_columns().collect();
    assert_eq!(values.len(), columns.len());
    for (v, c) in values.iter().zip(&columns) {
      assert_eq!(v.ty(), c.ty, "{}", c.name);
    }
    assert_eq!(values[0], ColumnValue::String(Some("Leaves of Grass".into())));
    assert_eq!(values[5], ColumnValue::String(Some("Fowler & Wells".into())));
    assert_eq!(values.last(), Some(&ColumnValue::Integer(Some(3))));

    assert_eq!(Manifestation::from_values(values).unwrap(), m);
  }

  #[test]
  fn all_null_row_decodes_to_default() {
    let values = Family::TABLE
      .data_columns()
      .map(|c| ColumnValue::null(c.ty))
      .collect();
    assert_eq!(Family::from_values(values).unwrap(), Family::default());
  }

  #[test]
  fn item_rejects_text_in_integer_column() {
    let mut values = Item::default().to_values();
    *values.last_mut().unwrap() = ColumnValue::String(Some("12".into()));
    assert!(matches!(
      Item::from_values(values).unwrap_err(),
      crate::Error::ColumnMismatch { column: "manifestation_id", .. }
    ));
  }
}
