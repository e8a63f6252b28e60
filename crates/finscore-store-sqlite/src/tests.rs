//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Datelike, NaiveDate, TimeZone, Utc};
use finscore_core::{
  document::{Document, DocumentType, DocumentVersion, SheetRef},
  patch::PatchOperation,
  sheet::{CellValue, Sheet},
  store::{DocumentOrder, DocumentQuery, DocumentStore, StoreFailure},
  subject::{Address, Subject, SubjectPatch, SubjectQuery},
};
use serde_json::json;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, d).unwrap() }

fn subject(id: &str, name: &str, active: bool) -> Subject {
  Subject {
    id: id.into(),
    name: name.into(),
    address: Address {
      region: "Praha".into(),
      street: "Národní 1".into(),
      zip:    "11000".into(),
    },
    currency: "CZK".into(),
    created: date(2020, 1, 1),
    updated: date(2020, 1, 2),
    active,
    extra: None,
  }
}

fn document(subject_id: &str, id: &str, key: &str, layer: i32, period: NaiveDate) -> Document {
  Document {
    id:         id.into(),
    subject_id: subject_id.into(),
    doc_type:   DocumentType {
      key:   key.into(),
      name:  format!("type {key}"),
      layer,
      order: 1,
    },
    period,
    version:    DocumentVersion {
      version: 1,
      author:  "ingest".into(),
      created: Utc.with_ymd_and_hms(period.year() + 1, 3, 1, 0, 0, 0).unwrap(),
    },
    sheets:     vec![SheetRef {
      id:     format!("{id}-s1"),
      name:   "main".into(),
      number: 1,
    }],
  }
}

fn sheet(subject_id: &str, doc_id: &str, number: u32, items: Vec<Vec<CellValue>>) -> Sheet {
  Sheet {
    id: format!("{doc_id}-s{number}"),
    subject_id: subject_id.into(),
    doc_id: doc_id.into(),
    name: format!("sheet {number}"),
    number,
    items,
  }
}

// ─── Subjects ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_subject() {
  let s = store().await;
  let created = s.create_subject(subject("12345678", "ACME", true)).await.unwrap();

  let fetched = s.get_subject("12345678").await.unwrap();
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn get_missing_subject_is_404() {
  let s = store().await;
  let err = s.get_subject("nope").await.unwrap_err();
  assert!(matches!(err, Error::NotFound { kind: "subject", .. }));
  assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn duplicate_create_is_409() {
  let s = store().await;
  s.create_subject(subject("1", "A", true)).await.unwrap();
  let err = s.create_subject(subject("1", "B", true)).await.unwrap_err();
  assert_eq!(err.status_code(), 409);
  assert_eq!(s.get_subject("1").await.unwrap().name, "A");
}

#[tokio::test]
async fn search_hides_inactive_unless_asked() {
  let s = store().await;
  s.create_subject(subject("1", "Alpha", true)).await.unwrap();
  s.create_subject(subject("2", "Beta", false)).await.unwrap();

  let active = s.search_subjects(&SubjectQuery::default()).await.unwrap();
  assert_eq!(active.len(), 1);
  assert_eq!(active[0].id, "1");

  let all = s
    .search_subjects(&SubjectQuery {
      include_inactive: true,
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn search_matches_case_insensitively() {
  let s = store().await;
  s.create_subject(subject("25596641", "Alpha Holding", true)).await.unwrap();
  s.create_subject(subject("49240901", "Beta Trade", true)).await.unwrap();

  let by_name = s
    .search_subjects(&SubjectQuery {
      name: Some("HOLD".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(by_name.len(), 1);
  assert_eq!(by_name[0].id, "25596641");

  let by_ic = s
    .search_subjects(&SubjectQuery {
      ic: Some("4924".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(by_ic.len(), 1);
  assert_eq!(by_ic[0].name, "Beta Trade");
}

#[tokio::test]
async fn search_treats_wildcards_literally() {
  let s = store().await;
  s.create_subject(subject("1", "100% Foods", true)).await.unwrap();
  s.create_subject(subject("2", "1000 Foods", true)).await.unwrap();

  let hits = s
    .search_subjects(&SubjectQuery {
      name: Some("0%".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].id, "1");
}

#[tokio::test]
async fn search_folds_non_ascii_case() {
  let s = store().await;
  s.create_subject(subject("45274649", "ČEZ a.s.", true)).await.unwrap();
  s.create_subject(subject("00177041", "Škoda Auto a.s.", true)).await.unwrap();

  let hits = s
    .search_subjects(&SubjectQuery {
      name: Some("čez".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].id, "45274649");

  let hits = s
    .search_subjects(&SubjectQuery {
      name: Some("ŠKODA".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].id, "00177041");
}

#[tokio::test]
async fn patch_subject_updates_only_supplied_fields() {
  let s = store().await;
  s.create_subject(subject("1", "Old", true)).await.unwrap();

  let patch = SubjectPatch {
    name: Some("New".into()),
    extra: Some("note".into()),
    ..Default::default()
  };
  let updated = s.patch_subject("1", patch.operations()).await.unwrap();
  assert_eq!(updated.name, "New");
  assert_eq!(updated.extra.as_deref(), Some("note"));
  assert_eq!(updated.currency, "CZK");
  assert!(updated.active);
  assert_eq!(s.get_subject("1").await.unwrap(), updated);
}

#[tokio::test]
async fn patch_subject_applies_explicit_deactivation() {
  let s = store().await;
  s.create_subject(subject("1", "A", true)).await.unwrap();

  let patch = SubjectPatch {
    active: Some(false),
    ..Default::default()
  };
  let updated = s.patch_subject("1", patch.operations()).await.unwrap();
  assert!(!updated.active);
}

#[tokio::test]
async fn patch_missing_subject_is_404() {
  let s = store().await;
  let err = s
    .patch_subject("ghost", vec![PatchOperation::set("/name", json!("x"))])
    .await
    .unwrap_err();
  assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn patch_that_breaks_schema_is_rejected_and_not_written() {
  let s = store().await;
  s.create_subject(subject("1", "A", true)).await.unwrap();

  let err = s
    .patch_subject("1", vec![PatchOperation::set("/active", json!("yes"))])
    .await
    .unwrap_err();
  assert_eq!(err.status_code(), 400);
  assert!(s.get_subject("1").await.unwrap().active);
}

#[tokio::test]
async fn delete_subject_then_missing() {
  let s = store().await;
  s.create_subject(subject("1", "A", true)).await.unwrap();
  s.delete_subject("1").await.unwrap();

  assert_eq!(s.get_subject("1").await.unwrap_err().status_code(), 404);
  assert_eq!(s.delete_subject("1").await.unwrap_err().status_code(), 404);
}

#[tokio::test]
async fn delete_subject_leaves_documents_in_place() {
  let s = store().await;
  s.create_subject(subject("S1", "A", true)).await.unwrap();
  s.put_document(document("S1", "d1", "001", 1, date(2023, 12, 31)))
    .await
    .unwrap();
  s.put_sheet(sheet("S1", "d1", 1, vec![vec![1.0.into()]]))
    .await
    .unwrap();

  s.delete_subject("S1").await.unwrap();

  assert_eq!(s.list_documents("S1").await.unwrap().len(), 1);
  assert!(s.find_sheet("S1", "d1", 1).await.unwrap().is_some());
}

// ─── Documents ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn documents_are_partitioned_by_subject() {
  let s = store().await;
  s.put_document(document("S1", "d1", "001", 1, date(2023, 12, 31)))
    .await
    .unwrap();
  s.put_document(document("S2", "d1", "001", 1, date(2022, 12, 31)))
    .await
    .unwrap();

  let docs = s.list_documents("S1").await.unwrap();
  assert_eq!(docs.len(), 1);
  assert_eq!(docs[0].period, date(2023, 12, 31));

  let other = s.get_document("S2", "d1").await.unwrap();
  assert_eq!(other.period, date(2022, 12, 31));
  assert_eq!(s.get_document("S3", "d1").await.unwrap_err().status_code(), 404);
}

#[tokio::test]
async fn list_documents_excludes_sheets() {
  let s = store().await;
  s.put_document(document("S1", "d1", "001", 1, date(2023, 12, 31)))
    .await
    .unwrap();
  s.put_sheet(sheet("S1", "d1", 1, vec![])).await.unwrap();

  assert_eq!(s.list_documents("S1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn query_filters_layer_and_window_and_orders_by_period() {
  let s = store().await;
  for (id, key, layer, period) in [
    ("a", "001", 1, date(2021, 12, 31)),
    ("b", "001", 1, date(2023, 12, 31)),
    ("c", "002", 2, date(2023, 12, 31)),
    ("d", "002", 1, date(2018, 12, 31)),
    ("e", "003", 1, date(2022, 12, 31)),
  ] {
    s.put_document(document("S1", id, key, layer, period))
      .await
      .unwrap();
  }

  let query = DocumentQuery {
    layer: Some(1),
    min_period: Some(date(2021, 12, 31)),
    ..Default::default()
  };
  let docs = s.query_documents("S1", &query).await.unwrap();
  let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
  assert_eq!(ids, ["b", "e", "a"]);
}

#[tokio::test]
async fn query_by_type_orders_by_created_and_bounds_range() {
  let s = store().await;
  for (id, year) in [("fc1", 2019), ("fc2", 2021), ("fc3", 2020)] {
    s.put_document(document("S1", id, "FC", 3, date(year, 12, 31)))
      .await
      .unwrap();
  }
  s.put_document(document("S1", "other", "001", 1, date(2022, 12, 31)))
    .await
    .unwrap();

  let all = s
    .query_documents("S1", &DocumentQuery {
      type_key: Some("FC".into()),
      order: DocumentOrder::CreatedDesc,
      ..Default::default()
    })
    .await
    .unwrap();
  let ids: Vec<_> = all.iter().map(|d| d.id.as_str()).collect();
  assert_eq!(ids, ["fc2", "fc3", "fc1"]);

  // created timestamps are 1 March of the year after the period
  let bounded = s
    .query_documents("S1", &DocumentQuery {
      type_key: Some("FC".into()),
      created_from: Some(Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap()),
      created_to: Some(Utc.with_ymd_and_hms(2021, 3, 1, 0, 0, 0).unwrap()),
      order: DocumentOrder::CreatedDesc,
      ..Default::default()
    })
    .await
    .unwrap();
  let ids: Vec<_> = bounded.iter().map(|d| d.id.as_str()).collect();
  assert_eq!(ids, ["fc3"]);
}

#[tokio::test]
async fn put_document_replaces_existing() {
  let s = store().await;
  let mut doc = document("S1", "d1", "001", 1, date(2023, 12, 31));
  s.put_document(doc.clone()).await.unwrap();
  doc.version.version = 2;
  s.put_document(doc).await.unwrap();

  let docs = s.list_documents("S1").await.unwrap();
  assert_eq!(docs.len(), 1);
  assert_eq!(docs[0].version.version, 2);
}

// ─── Sheets ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn sheets_listed_by_number_and_found_by_number() {
  let s = store().await;
  s.put_sheet(sheet("S1", "d1", 2, vec![vec!["b".into()]]))
    .await
    .unwrap();
  s.put_sheet(sheet("S1", "d1", 1, vec![vec!["a".into()]]))
    .await
    .unwrap();
  s.put_sheet(sheet("S1", "d2", 1, vec![])).await.unwrap();

  let sheets = s.list_sheets("S1", "d1").await.unwrap();
  let numbers: Vec<_> = sheets.iter().map(|s| s.number).collect();
  assert_eq!(numbers, [1, 2]);

  let second = s.find_sheet("S1", "d1", 2).await.unwrap().unwrap();
  assert_eq!(second.id, "d1-s2");
  assert!(s.find_sheet("S1", "d1", 3).await.unwrap().is_none());
}

#[tokio::test]
async fn get_sheet_by_id() {
  let s = store().await;
  s.put_sheet(sheet("S1", "d1", 1, vec![vec![5.0.into()]]))
    .await
    .unwrap();

  let found = s.get_sheet("S1", "d1-s1").await.unwrap();
  assert_eq!(found.items, vec![vec![CellValue::Number(5.0)]]);
  assert_eq!(s.get_sheet("S2", "d1-s1").await.unwrap_err().status_code(), 404);
}

#[tokio::test]
async fn patch_sheet_sets_cells() {
  let s = store().await;
  s.put_sheet(sheet("S1", "d1", 1, vec![
    vec!["a".into(), 1.0.into()],
    vec!["b".into(), 2.0.into()],
  ]))
  .await
  .unwrap();

  let patched = s
    .patch_sheet("S1", "d1-s1", vec![
      PatchOperation::set("/items/1/1", json!(42.0)),
      PatchOperation::set("/items/0/0", json!(null)),
    ])
    .await
    .unwrap();
  assert_eq!(patched.items, vec![
    vec![CellValue::Null, CellValue::Number(1.0)],
    vec![CellValue::Text("b".into()), CellValue::Number(42.0)],
  ]);
  assert_eq!(s.get_sheet("S1", "d1-s1").await.unwrap(), patched);
}

#[tokio::test]
async fn patch_sheet_out_of_bounds_is_400_and_atomic() {
  let s = store().await;
  s.put_sheet(sheet("S1", "d1", 1, vec![vec![1.0.into()]]))
    .await
    .unwrap();

  let err = s
    .patch_sheet("S1", "d1-s1", vec![
      PatchOperation::set("/items/0/0", json!(9.0)),
      PatchOperation::set("/items/5/0", json!(9.0)),
    ])
    .await
    .unwrap_err();
  assert_eq!(err.status_code(), 400);
  let unchanged = s.get_sheet("S1", "d1-s1").await.unwrap();
  assert_eq!(unchanged.items, vec![vec![CellValue::Number(1.0)]]);
}

#[tokio::test]
async fn concurrent_patches_on_disjoint_cells_all_land() {
  let s = store().await;
  s.put_sheet(sheet("S1", "d1", 1, vec![vec![CellValue::Null; 4]]))
    .await
    .unwrap();

  let patches = (0..4).map(|col| {
    s.patch_sheet("S1", "d1-s1", vec![PatchOperation::set(
      format!("/items/0/{col}"),
      json!(col as f64),
    )])
  });
  futures::future::try_join_all(patches).await.unwrap();

  let result = s.get_sheet("S1", "d1-s1").await.unwrap();
  assert_eq!(result.items, vec![vec![
    CellValue::Number(0.0),
    CellValue::Number(1.0),
    CellValue::Number(2.0),
    CellValue::Number(3.0),
  ]]);
}

#[tokio::test]
async fn ping_succeeds() {
  store().await.ping().await.unwrap();
}
