//! Integration tests for `SqliteStore` against an in-memory database.

use frbr_core::{
  entity::{Concept, Expression, Item, Manifestation, Person, Place, Work},
  kind::{AgentRef, EntityRef},
  link::{Aboutness, Creation, Ownership, Production, Realization, Reification},
  row::Record,
  schema::{CATALOG, ColumnType, LoadOutcome, Schema},
  store::CatalogStore,
  version::SchemaVersion,
  view::{DanglingReference, Defect},
};

use crate::{Error, SqliteStore, schema::MIGRATIONS_TABLE};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn exec(s: &SqliteStore, sql: &'static str) {
  s.conn
    .call(move |conn| {
      conn.execute_batch(sql)?;
      Ok(())
    })
    .await
    .unwrap();
}

fn work(title: &str) -> Work {
  Work { title: Some(title.to_owned()), ..Default::default() }
}

// ─── Schema ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn physical_tables_match_the_catalogue() {
  let s = store().await;
  let described = s.describe().await.unwrap();

  let mut names: Vec<&str> = described.iter().map(|t| t.name.as_str()).collect();
  names.retain(|n| *n != MIGRATIONS_TABLE);
  let expected: Vec<&str> = CATALOG.tables.iter().map(|t| t.name).collect();
  assert_eq!(names, expected);

  for table in CATALOG.tables {
    let info = described.iter().find(|t| t.name == table.name).unwrap();
    let (id, rest) = info.columns.split_first().unwrap();
    assert_eq!(id.name, "id");
    assert!(id.primary_key);
    assert_eq!(id.ty, Some(ColumnType::Integer));

    assert_eq!(rest.len(), table.columns.len(), "{}", table.name);
    for (actual, declared) in rest.iter().zip(table.columns) {
      assert_eq!(actual.name, declared.name);
      assert_eq!(actual.ty, Some(declared.ty), "{}.{}", table.name, declared.name);
      assert!(!actual.not_null);
      assert!(!actual.primary_key);
      assert_eq!(actual.default, None);
    }
    assert!(info.foreign_keys.is_empty(), "{}", table.name);
    assert!(info.indexes.is_empty(), "{}", table.name);
  }
}

#[tokio::test]
async fn open_records_the_catalogue_version() {
  let s = store().await;
  assert_eq!(
    s.schema_version().await.unwrap(),
    Some(SchemaVersion::new(20080829161616))
  );
}

#[tokio::test]
async fn connect_leaves_the_database_untouched() {
  let s = SqliteStore::connect_in_memory().await.unwrap();
  assert_eq!(s.schema_version().await.unwrap(), None);
  assert!(s.describe().await.unwrap().is_empty());
}

#[tokio::test]
async fn reloading_the_same_version_keeps_rows() {
  let s = store().await;
  s.insert(work("Hamlet")).await.unwrap();

  let outcome = s.load_schema(&CATALOG).await.unwrap();
  assert_eq!(outcome, LoadOutcome::UpToDate { version: CATALOG.version });
  assert_eq!(s.list::<Work>().await.unwrap().len(), 1);
}

#[tokio::test]
async fn newer_version_recreates_every_table() {
  let s = store().await;
  s.insert(work("Hamlet")).await.unwrap();

  let newer: &'static Schema = Box::leak(Box::new(Schema {
    version: SchemaVersion::new(20090101000000),
    tables:  CATALOG.tables,
  }));
  let outcome = s.load_schema(newer).await.unwrap();
  assert_eq!(outcome, LoadOutcome::Upgraded {
    from: CATALOG.version,
    to:   newer.version,
  });
  assert!(s.list::<Work>().await.unwrap().is_empty());
  assert_eq!(s.schema_version().await.unwrap(), Some(newer.version));

  // The older definition is now behind and must not touch anything.
  s.insert(work("Lear")).await.unwrap();
  let outcome = s.load_schema(&CATALOG).await.unwrap();
  assert_eq!(outcome, LoadOutcome::Ahead {
    stored:  newer.version,
    defined: CATALOG.version,
  });
  assert_eq!(s.list::<Work>().await.unwrap().len(), 1);
}

#[tokio::test]
async fn corrupt_version_row_is_an_error() {
  let s = store().await;
  exec(&s, "INSERT INTO schema_migrations (version) VALUES ('yesterday')").await;
  assert!(matches!(
    s.schema_version().await,
    Err(Error::Database(tokio_rusqlite::Error::Other(_)))
  ));
}

// ─── Rows ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_stamps_entities_and_get_reads_back() {
  let s = store().await;
  let inserted = s
    .insert(Person {
      name: Some("Joyce, James".into()),
      dates: Some("1882-1941".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert!(inserted.created_at.is_some());
  assert_eq!(inserted.created_at, inserted.updated_at);

  let fetched = s.get::<Person>(inserted.id).await.unwrap().unwrap();
  assert_eq!(fetched, inserted);
}

#[tokio::test]
async fn link_rows_carry_no_timestamps() {
  let s = store().await;
  let r = s
    .insert(Reification { work_id: 1, expression_id: 2, relation: None })
    .await
    .unwrap();
  assert_eq!(r.created_at, None);
  assert_eq!(r.updated_at, None);
  assert_eq!(s.get::<Reification>(r.id).await.unwrap().unwrap(), r);
}

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  assert!(s.get::<Work>(42).await.unwrap().is_none());
}

#[tokio::test]
async fn list_is_in_id_order() {
  let s = store().await;
  for title in ["A", "B", "C"] {
    s.insert(work(title)).await.unwrap();
  }
  let titles: Vec<_> = s
    .list::<Work>()
    .await
    .unwrap()
    .into_iter()
    .map(|w| w.data.title.unwrap())
    .collect();
  assert_eq!(titles, ["A", "B", "C"]);
}

#[tokio::test]
async fn update_replaces_data_and_keeps_created_at() {
  let s = store().await;
  let original = s.insert(work("Draft")).await.unwrap();

  let updated = s.update(original.id, work("Final")).await.unwrap();
  assert_eq!(updated.data.title.as_deref(), Some("Final"));
  assert_eq!(updated.created_at, original.created_at);
  assert!(updated.updated_at >= original.updated_at);
}

#[tokio::test]
async fn update_and_delete_missing_rows_fail() {
  let s = store().await;
  assert!(matches!(
    s.update(9, work("x")).await,
    Err(Error::RecordNotFound { table: "works", id: 9 })
  ));
  assert!(matches!(
    s.delete::<Concept>(9).await,
    Err(Error::RecordNotFound { table: "concepts", id: 9 })
  ));
}

#[tokio::test]
async fn delete_leaves_referring_rows_in_place() {
  let s = store().await;
  let w = s.insert(work("Orphaned")).await.unwrap();
  let c = s
    .insert(Creation {
      creator:  AgentRef::Person(1),
      work_id:  w.id,
      relation: None,
    })
    .await
    .unwrap();

  s.delete::<Work>(w.id).await.unwrap();
  assert!(s.get::<Work>(w.id).await.unwrap().is_none());
  assert!(s.get::<Creation>(c.id).await.unwrap().is_some());
}

#[tokio::test]
async fn rows_written_by_other_tools_decode() {
  let s = store().await;
  exec(
    &s,
    "INSERT INTO works (created_at, updated_at, title, date)
     VALUES ('2008-08-29 16:16:16', NULL, 'Ulysses', 1922)",
  )
  .await;

  let w = s.list::<Work>().await.unwrap().remove(0);
  assert!(w.created_at.is_some());
  assert!(w.updated_at.is_none());
  assert_eq!(w.data.date.as_deref(), Some("1922"));
}

// ─── FRBR chain ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn work_to_item_chain() {
  let s = store().await;
  let w = s.insert(work("Ulysses")).await.unwrap();
  let e = s
    .insert(Expression {
      title: Some("Ulysses".into()),
      language: Some("en".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  s.insert(Reification { work_id: w.id, expression_id: e.id, relation: None })
    .await
    .unwrap();
  let m = s
    .insert(Manifestation {
      publisher: Some("Shakespeare and Company".into()),
      expression_id: Some(e.id),
      ..Default::default()
    })
    .await
    .unwrap();
  let i = s
    .insert(Item {
      call_number: Some("PR6019.O9 U4".into()),
      manifestation_id: Some(m.id),
      ..Default::default()
    })
    .await
    .unwrap();

  let expressions = s.expressions_of_work(w.id).await.unwrap();
  assert_eq!(expressions, vec![e.clone()]);
  assert_eq!(s.works_of_expression(e.id).await.unwrap(), vec![w.clone()]);
  assert_eq!(s.manifestations_of_expression(e.id).await.unwrap(), vec![m.clone()]);
  assert_eq!(s.items_of_manifestation(m.id).await.unwrap(), vec![i.clone()]);

  let view = s.materialize_work(w.id).await.unwrap().unwrap();
  assert_eq!(view.work, w);
  assert_eq!(view.expressions.len(), 1);
  assert_eq!(view.expressions[0].manifestations[0].manifestation, m);
  assert_eq!(view.item_ids(), vec![i.id]);
}

#[tokio::test]
async fn expression_can_realize_several_works() {
  let s = store().await;
  let a = s.insert(work("A")).await.unwrap();
  let b = s.insert(work("B")).await.unwrap();
  let e = s.insert(Expression::default()).await.unwrap();
  for w in [&a, &b] {
    s.insert(Reification { work_id: w.id, expression_id: e.id, relation: None })
      .await
      .unwrap();
  }

  let works: Vec<i64> = s
    .works_of_expression(e.id)
    .await
    .unwrap()
    .iter()
    .map(|w| w.id)
    .collect();
  assert_eq!(works, [a.id, b.id]);
}

#[tokio::test]
async fn materialize_missing_work_is_none() {
  let s = store().await;
  assert!(s.materialize_work(1).await.unwrap().is_none());
}

// ─── Polymorphic links ───────────────────────────────────────────────────────

#[tokio::test]
async fn creators_and_subjects_round_trip() {
  let s = store().await;
  let w = s.insert(work("Dubliners")).await.unwrap();
  let joyce = s.insert(Person::default()).await.unwrap();
  let dublin = s.insert(Place::default()).await.unwrap();

  let creator = AgentRef::Person(joyce.id);
  s.insert(Creation {
    creator,
    work_id: w.id,
    relation: Some("author".into()),
  })
  .await
  .unwrap();
  let subjects = [EntityRef::Place(dublin.id), EntityRef::Work(w.id)];
  for subject in subjects {
    s.insert(Aboutness { subject, work_id: w.id }).await.unwrap();
  }

  assert_eq!(s.creators_of_work(w.id).await.unwrap(), vec![creator]);
  assert_eq!(s.subjects_of_work(w.id).await.unwrap(), subjects.to_vec());
  assert_eq!(s.works_created_by(creator).await.unwrap(), vec![w.clone()]);
  assert_eq!(s.works_about(EntityRef::Place(dublin.id)).await.unwrap(), vec![w.clone()]);

  // Same id, different kind: no match.
  assert!(s.works_created_by(AgentRef::Family(joyce.id)).await.unwrap().is_empty());
  assert!(s.works_about(EntityRef::Concept(dublin.id)).await.unwrap().is_empty());
}

#[tokio::test]
async fn agent_links_on_expressions_manifestations_and_items() {
  let s = store().await;
  let r = s
    .insert(Realization {
      realizer:      AgentRef::CorporateBody(3),
      expression_id: 1,
      relation:      Some("translator".into()),
    })
    .await
    .unwrap();
  let p = s
    .insert(Production {
      producer:         AgentRef::Family(4),
      manifestation_id: 2,
      relation:         None,
    })
    .await
    .unwrap();
  let o = s
    .insert(Ownership {
      owner:    AgentRef::Person(5),
      item_id:  3,
      relation: None,
    })
    .await
    .unwrap();

  assert_eq!(s.get::<Realization>(r.id).await.unwrap().unwrap(), r);
  assert_eq!(s.get::<Production>(p.id).await.unwrap().unwrap(), p);
  assert_eq!(s.get::<Ownership>(o.id).await.unwrap().unwrap(), o);
}

#[tokio::test]
async fn unknown_discriminator_is_a_decode_error() {
  let s = store().await;
  exec(
    &s,
    "INSERT INTO creations (creator_id, creator_type, work_id) VALUES (1, 'Concept', 1)",
  )
  .await;

  assert!(matches!(
    s.creators_of_work(1).await,
    Err(Error::Core(frbr_core::Error::UnknownDiscriminator { .. }))
  ));
}

#[tokio::test]
async fn half_set_reference_is_a_decode_error() {
  let s = store().await;
  exec(&s, "INSERT INTO aboutnesses (subject_id, work_id) VALUES (1, 1)").await;

  assert!(matches!(
    s.subjects_of_work(1).await,
    Err(Error::Core(frbr_core::Error::IncompleteReference { .. }))
  ));
}

// ─── Integrity ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn consistent_catalogue_has_no_dangling_references() {
  let s = store().await;
  let w = s.insert(work("W")).await.unwrap();
  let p = s.insert(Person::default()).await.unwrap();
  s.insert(Creation { creator: AgentRef::Person(p.id), work_id: w.id, relation: None })
    .await
    .unwrap();
  s.insert(Manifestation::default()).await.unwrap();

  assert!(s.dangling_references().await.unwrap().is_empty());
}

#[tokio::test]
async fn dangling_references_are_reported() {
  let s = store().await;
  let w = s.insert(work("W")).await.unwrap();
  let m = s
    .insert(Manifestation { expression_id: Some(77), ..Default::default() })
    .await
    .unwrap();
  let c = s
    .insert(Creation { creator: AgentRef::Family(8), work_id: w.id, relation: None })
    .await
    .unwrap();
  exec(
    &s,
    "INSERT INTO aboutnesses (subject_id, subject_type, work_id) VALUES (1, 'Unicorn', 1)",
  )
  .await;

  let found = s.dangling_references().await.unwrap();
  assert_eq!(found.len(), 3, "{found:?}");
  assert!(found.contains(&DanglingReference {
    table:  "manifestations".into(),
    row_id: m.id,
    column: "expression_id".into(),
    defect: Defect::MissingTarget { table: "expressions".into(), id: 77 },
  }));
  assert!(found.contains(&DanglingReference {
    table:  "creations".into(),
    row_id: c.id,
    column: "creator_id".into(),
    defect: Defect::MissingTarget { table: "families".into(), id: 8 },
  }));
  assert!(found.iter().any(|d| d.table == "aboutnesses"
    && d.defect == Defect::UnknownType { value: "Unicorn".into() }));
}

#[tokio::test]
async fn undecodable_link_rows_are_reported() {
  let s = store().await;
  let w = s.insert(work("W")).await.unwrap();
  exec(
    &s,
    "INSERT INTO creations (creator_id, creator_type, work_id) VALUES (5, NULL, 1);
     INSERT INTO aboutnesses (subject_id, subject_type, work_id) VALUES (NULL, 'Place', 1);
     INSERT INTO ownerships (owner_id, owner_type, item_id) VALUES (NULL, NULL, NULL);
     INSERT INTO reifications (work_id, expression_id) VALUES (1, NULL);",
  )
  .await;

  // The typed API refuses these rows...
  assert!(s.materialize_work(w.id).await.is_err());
  assert!(matches!(
    s.list::<Reification>().await,
    Err(Error::Core(frbr_core::Error::MissingKey { column: "expression_id", .. }))
  ));

  // ...so the audit must name every one of them.
  let found = s.dangling_references().await.unwrap();
  let defects: Vec<(&str, &str, &Defect)> = found
    .iter()
    .map(|d| (d.table.as_str(), d.column.as_str(), &d.defect))
    .collect();
  assert_eq!(defects.len(), 5, "{found:?}");
  for expected in [
    ("creations", "creator_id", &Defect::IncompleteReference),
    ("aboutnesses", "subject_id", &Defect::IncompleteReference),
    ("ownerships", "owner_id", &Defect::MissingKey),
    ("ownerships", "item_id", &Defect::MissingKey),
    ("reifications", "expression_id", &Defect::MissingKey),
  ] {
    assert!(defects.contains(&expected), "{expected:?} not in {found:?}");
  }
}

#[tokio::test]
async fn null_entity_keys_are_not_defects() {
  let s = store().await;
  s.insert(Item::default()).await.unwrap();
  s.insert(Manifestation::default()).await.unwrap();
  assert!(s.dangling_references().await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_target_leaves_a_dangling_reference() {
  let s = store().await;
  let w = s.insert(work("W")).await.unwrap();
  let e = s.insert(Expression::default()).await.unwrap();
  let r = s
    .insert(Reification { work_id: w.id, expression_id: e.id, relation: None })
    .await
    .unwrap();
  s.delete::<Expression>(e.id).await.unwrap();

  let found = s.dangling_references().await.unwrap();
  assert_eq!(found, vec![DanglingReference {
    table:  "reifications".into(),
    row_id: r.id,
    column: "expression_id".into(),
    defect: Defect::MissingTarget { table: "expressions".into(), id: e.id },
  }]);
  assert!(s.expressions_of_work(w.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn records_serialize_flat() {
  let s = store().await;
  let w: Record<Work> = s.insert(work("Flat")).await.unwrap();
  let value = serde_json::to_value(&w).unwrap();
  assert_eq!(value["title"], "Flat");
  assert_eq!(value["id"], w.id);
}
