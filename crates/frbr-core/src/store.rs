//! The `CatalogStore` trait.
//!
//! Implemented by storage backends (e.g. `frbr-store-sqlite`). The CLI
//! depends on this abstraction, not on a concrete backend.

use std::future::Future;

use crate::{
  entity::{Expression, Item, Manifestation, Work},
  kind::{AgentRef, EntityRef},
  row::{Record, Row},
  schema::{LoadOutcome, Schema},
  version::SchemaVersion,
  view::{DanglingReference, WorkView},
};

/// Abstraction over a catalogue storage backend.
///
/// Backends store rows generically through [`Row`]; they add no constraints
/// beyond what the [`Schema`] declares, which is none.
pub trait CatalogStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Schema ────────────────────────────────────────────────────────────

  /// Materialise `schema` unless the stored version is already at or past
  /// `schema.version`. Tables are dropped and recreated when loading.
  fn load_schema(
    &self,
    schema: &'static Schema,
  ) -> impl Future<Output = Result<LoadOutcome, Self::Error>> + Send + '_;

  /// The highest recorded schema version, if any.
  fn schema_version(
    &self,
  ) -> impl Future<Output = Result<Option<SchemaVersion>, Self::Error>> + Send + '_;

  // ── Rows ──────────────────────────────────────────────────────────────

  /// Insert a row. The id and, where the table has them, both timestamps
  /// are assigned by the store.
  fn insert<R: Row>(
    &self,
    row: R,
  ) -> impl Future<Output = Result<Record<R>, Self::Error>> + Send + '_;

  fn get<R: Row>(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Record<R>>, Self::Error>> + Send + '_;

  /// Every row of `R`'s table, in id order.
  fn list<R: Row>(
    &self,
  ) -> impl Future<Output = Result<Vec<Record<R>>, Self::Error>> + Send + '_;

  /// Replace a row's data, refreshing `updated_at`. Errors if absent.
  fn update<R: Row>(
    &self,
    id: i64,
    row: R,
  ) -> impl Future<Output = Result<Record<R>, Self::Error>> + Send + '_;

  /// Delete a row. Errors if absent. Rows referring to it are left alone.
  fn delete<R: Row>(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── FRBR chain ────────────────────────────────────────────────────────

  /// Expressions linked to a work through `reifications`.
  fn expressions_of_work(
    &self,
    work_id: i64,
  ) -> impl Future<Output = Result<Vec<Record<Expression>>, Self::Error>> + Send + '_;

  /// Works linked to an expression through `reifications`.
  fn works_of_expression(
    &self,
    expression_id: i64,
  ) -> impl Future<Output = Result<Vec<Record<Work>>, Self::Error>> + Send + '_;

  fn manifestations_of_expression(
    &self,
    expression_id: i64,
  ) -> impl Future<Output = Result<Vec<Record<Manifestation>>, Self::Error>> + Send + '_;

  fn items_of_manifestation(
    &self,
    manifestation_id: i64,
  ) -> impl Future<Output = Result<Vec<Record<Item>>, Self::Error>> + Send + '_;

  // ── Polymorphic links ─────────────────────────────────────────────────

  fn creators_of_work(
    &self,
    work_id: i64,
  ) -> impl Future<Output = Result<Vec<AgentRef>, Self::Error>> + Send + '_;

  fn works_created_by(
    &self,
    agent: AgentRef,
  ) -> impl Future<Output = Result<Vec<Record<Work>>, Self::Error>> + Send + '_;

  fn subjects_of_work(
    &self,
    work_id: i64,
  ) -> impl Future<Output = Result<Vec<EntityRef>, Self::Error>> + Send + '_;

  fn works_about(
    &self,
    subject: EntityRef,
  ) -> impl Future<Output = Result<Vec<Record<Work>>, Self::Error>> + Send + '_;

  // ── Views ─────────────────────────────────────────────────────────────

  /// Assemble a [`WorkView`]. Returns `None` if the work does not exist.
  fn materialize_work(
    &self,
    work_id: i64,
  ) -> impl Future<Output = Result<Option<WorkView>, Self::Error>> + Send + '_;

  /// Every reference column value that does not resolve to a row of an
  /// allowed table, plus link rows whose keys are NULL or half set.
  fn dangling_references(
    &self,
  ) -> impl Future<Output = Result<Vec<DanglingReference>, Self::Error>> + Send + '_;
}
