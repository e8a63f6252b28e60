//! Loading fixture data into a store at startup.
//!
//! A fixture is one JSON file:
//!
//! ```json
//! { "subjects": [...], "documents": [...], "sheets": [...] }
//! ```
//!
//! Documents and sheets are upserted. Subjects that already exist are left
//! untouched, so a fixture can be replayed against a persistent store.

use finscore_core::{
  document::Document,
  sheet::Sheet,
  store::{DocumentStore, StoreFailure},
  subject::Subject,
};
use serde::Deserialize;

const CONFLICT: u16 = 409;

#[derive(Debug, Default, Deserialize)]
pub struct Fixture {
  #[serde(default)]
  pub subjects:  Vec<Subject>,
  #[serde(default)]
  pub documents: Vec<Document>,
  #[serde(default)]
  pub sheets:    Vec<Sheet>,
}

/// Counts of records written by [`Fixture::load_into`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
  pub subjects:         usize,
  pub skipped_subjects: usize,
  pub documents:        usize,
  pub sheets:           usize,
}

impl Fixture {
  pub fn from_json(raw: &str) -> serde_json::Result<Self> { serde_json::from_str(raw) }

  pub async fn load_into<S: DocumentStore>(self, store: &S) -> Result<SeedReport, S::Error> {
    let mut report = SeedReport::default();

    for subject in self.subjects {
      let id = subject.id.clone();
      match store.create_subject(subject).await {
        Ok(_) => report.subjects += 1,
        Err(e) if e.status_code() == CONFLICT => {
          tracing::debug!(subject_id = %id, "subject already present, skipping");
          report.skipped_subjects += 1;
        }
        Err(e) => return Err(e),
      }
    }
    for document in self.documents {
      store.put_document(document).await?;
      report.documents += 1;
    }
    for sheet in self.sheets {
      store.put_sheet(sheet).await?;
      report.sheets += 1;
    }
    Ok(report)
  }
}

#[cfg(test)]
mod tests {
  use finscore_core::subject::SubjectQuery;
  use finscore_store_sqlite::SqliteStore;

  use super::*;

  const FIXTURE: &str = r#"{
    "subjects": [{
      "id": "S1",
      "name": "ACME",
      "address": { "region": "Praha", "street": "Národní 1", "zip": "11000" },
      "currency": "CZK",
      "created": "2020-01-01",
      "updated": "2020-01-01"
    }],
    "documents": [{
      "id": "d1",
      "subject_id": "S1",
      "type": { "key": "001", "name": "Balance sheet", "layer": 1, "order": 1 },
      "period": "2020-12-31",
      "version": { "version": 1, "author": "ingest", "created": "2021-03-01T00:00:00" },
      "sheets": [{ "id": "d1-s1", "name": "main", "number": 1 }]
    }],
    "sheets": [{
      "id": "d1-s1",
      "subject_id": "S1",
      "doc_id": "d1",
      "name": "main",
      "number": 1,
      "items": [["total", 42.0]]
    }]
  }"#;

  #[tokio::test]
  async fn fixture_loads_and_replays() {
    let store = SqliteStore::open_in_memory().await.unwrap();

    let report = Fixture::from_json(FIXTURE)
      .unwrap()
      .load_into(&store)
      .await
      .unwrap();
    assert_eq!(report, SeedReport {
      subjects:         1,
      skipped_subjects: 0,
      documents:        1,
      sheets:           1,
    });

    let report = Fixture::from_json(FIXTURE)
      .unwrap()
      .load_into(&store)
      .await
      .unwrap();
    assert_eq!(report.skipped_subjects, 1);

    let subjects = store.search_subjects(&SubjectQuery::default()).await.unwrap();
    assert_eq!(subjects.len(), 1);
    let sheet = store.find_sheet("S1", "d1", 1).await.unwrap().unwrap();
    assert_eq!(sheet.items[0][1].as_number(), Some(42.0));
  }

  #[test]
  fn empty_fixture_is_valid() {
    let fixture = Fixture::from_json("{}").unwrap();
    assert!(fixture.subjects.is_empty() && fixture.sheets.is_empty());
  }
}
