//! Schema version identifiers.
//!
//! A version is the UTC timestamp of the migration that produced the schema,
//! written as fourteen digits (`YYYYMMDDHHMMSS`). Versions order numerically,
//! which for this fixed-width form is also chronological.

use std::{fmt, str::FromStr};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const FORMAT: &str = "%Y%m%d%H%M%S";
const MAX: u64 = 99_999_999_999_999;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct SchemaVersion(u64);

impl SchemaVersion {
  /// Build a version from its numeric form without checking that it is a
  /// real timestamp.
  ///
  /// Intended for constants; use [`str::parse`] for untrusted input.
  /// Debug builds reject values wider than fourteen digits.
  pub const fn new(raw: u64) -> Self {
    debug_assert!(raw <= MAX, "schema versions have at most fourteen digits");
    Self(raw)
  }

  pub fn get(self) -> u64 { self.0 }

  /// The migration timestamp this version encodes.
  pub fn timestamp(self) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(&self.to_string(), FORMAT).ok()
  }
}

impl fmt::Display for SchemaVersion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:014}", self.0)
  }
}

impl FromStr for SchemaVersion {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let s = s.trim();
    if s.len() != 14 || !s.bytes().all(|b| b.is_ascii_digit()) {
      return Err(Error::InvalidVersion(s.to_owned()));
    }
    NaiveDateTime::parse_from_str(s, FORMAT)
      .map_err(|_| Error::InvalidVersion(s.to_owned()))?;
    s.parse::<u64>()
      .map(Self)
      .map_err(|_| Error::InvalidVersion(s.to_owned()))
  }
}

impl TryFrom<String> for SchemaVersion {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { s.parse() }
}

impl From<SchemaVersion> for String {
  fn from(v: SchemaVersion) -> Self { v.to_string() }
}
