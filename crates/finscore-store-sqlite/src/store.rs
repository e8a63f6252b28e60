//! [`SqliteStore`]: the SQLite implementation of [`DocumentStore`].

use std::path::Path;

use finscore_core::{
  document::Document,
  patch::PatchOperation,
  sheet::Sheet,
  store::{DocumentOrder, DocumentQuery, DocumentStore},
  subject::{Subject, SubjectQuery},
};
use rusqlite::OptionalExtension as _;
use tracing::debug;

use crate::{
  Error, Result,
  encode::{
    RECORD_DOC, RECORD_SHEET, apply_patch, contains_folded, decode_bodies, decode_body,
    encode_body,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A finscore document store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Read one body from the `documents` container.
  async fn read_record(
    &self,
    record_type: &'static str,
    subject_id: &str,
    id: &str,
  ) -> Result<Option<String>> {
    let subject_id = subject_id.to_owned();
    let id = id.to_owned();

    let body = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT body FROM documents
               WHERE subject_id = ?1 AND id = ?2 AND record_type = ?3",
              rusqlite::params![subject_id, id, record_type],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(body)
  }

  /// Insert or replace one body in the `documents` container.
  async fn write_record(
    &self,
    record_type: &'static str,
    subject_id: &str,
    id: &str,
    body: String,
  ) -> Result<()> {
    let subject_id = subject_id.to_owned();
    let id = id.to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO documents (subject_id, id, record_type, body)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![subject_id, id, record_type, body],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for SqliteStore {
  type Error = Error;

  // ── Subjects ──────────────────────────────────────────────────────────────

  async fn search_subjects(&self, query: &SubjectQuery) -> Result<Vec<Subject>> {
    let active_only = !query.include_inactive;

    let bodies: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT body FROM subjects
           WHERE (?1 = 0 OR json_extract(body, '$.active') = 1)",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![active_only], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;

    // SQLite's LIKE only folds ASCII, so patterns are matched here.
    let mut subjects: Vec<Subject> = decode_bodies(bodies)?;
    subjects.retain(|subject| {
      contains_folded(&subject.id, query.ic.as_deref())
        && contains_folded(&subject.name, query.name.as_deref())
    });
    Ok(subjects)
  }

  async fn get_subject(&self, id: &str) -> Result<Subject> {
    let key = id.to_owned();

    let body: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT body FROM subjects WHERE id = ?1",
              rusqlite::params![key],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    match body {
      Some(b) => decode_body(&b),
      None => Err(Error::NotFound {
        kind: "subject",
        id:   id.to_owned(),
      }),
    }
  }

  async fn create_subject(&self, subject: Subject) -> Result<Subject> {
    let id = subject.id.clone();
    let body = encode_body(&subject)?;

    let inserted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT OR IGNORE INTO subjects (id, body) VALUES (?1, ?2)",
          rusqlite::params![id, body],
        )?)
      })
      .await?;

    if inserted == 0 {
      return Err(Error::Conflict {
        kind: "subject",
        id:   subject.id,
      });
    }
    Ok(subject)
  }

  async fn patch_subject(&self, id: &str, ops: Vec<PatchOperation>) -> Result<Subject> {
    let key = id.to_owned();
    let not_found = Error::NotFound {
      kind: "subject",
      id:   id.to_owned(),
    };

    let outcome: Result<Subject> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let body: Option<String> = tx
          .query_row(
            "SELECT body FROM subjects WHERE id = ?1",
            rusqlite::params![key],
            |row| row.get(0),
          )
          .optional()?;
        let Some(body) = body else {
          return Ok(Err(not_found));
        };
        let (subject, patched) = match apply_patch::<Subject>(&body, &ops) {
          Ok(v) => v,
          Err(e) => return Ok(Err(e)),
        };
        tx.execute(
          "UPDATE subjects SET body = ?2 WHERE id = ?1",
          rusqlite::params![key, patched],
        )?;
        tx.commit()?;
        Ok(Ok(subject))
      })
      .await?;

    outcome
  }

  async fn delete_subject(&self, id: &str) -> Result<()> {
    let key = id.to_owned();

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM subjects WHERE id = ?1",
          rusqlite::params![key],
        )?)
      })
      .await?;

    if deleted == 0 {
      return Err(Error::NotFound {
        kind: "subject",
        id:   id.to_owned(),
      });
    }
    Ok(())
  }

  // ── Documents ─────────────────────────────────────────────────────────────

  async fn list_documents(&self, subject_id: &str) -> Result<Vec<Document>> {
    let partition = subject_id.to_owned();

    let bodies: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT body FROM documents
           WHERE subject_id = ?1 AND record_type = 'doc'",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![partition], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;

    decode_bodies(bodies)
  }

  async fn get_document(&self, subject_id: &str, document_id: &str) -> Result<Document> {
    match self.read_record(RECORD_DOC, subject_id, document_id).await? {
      Some(b) => decode_body(&b),
      None => Err(Error::NotFound {
        kind: "document",
        id:   document_id.to_owned(),
      }),
    }
  }

  async fn query_documents(
    &self,
    subject_id: &str,
    query: &DocumentQuery,
  ) -> Result<Vec<Document>> {
    let partition = subject_id.to_owned();
    let type_key = query.type_key.clone();
    let layer = query.layer;
    let min_period = query.min_period.map(|p| p.to_string());

    let bodies: Vec<String> = self
      .conn
      .call(move |conn| {
        // Periods are stored as ISO dates, so text order is date order.
        let mut stmt = conn.prepare(
          "SELECT body FROM documents
           WHERE subject_id = ?1 AND record_type = 'doc'
             AND (?2 IS NULL OR json_extract(body, '$.type.key') = ?2)
             AND (?3 IS NULL OR json_extract(body, '$.type.layer') = ?3)
             AND (?4 IS NULL OR json_extract(body, '$.period') >= ?4)
           ORDER BY json_extract(body, '$.period') DESC",
        )?;
        let rows = stmt
          .query_map(
            rusqlite::params![partition, type_key, layer, min_period],
            |row| row.get(0),
          )?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;

    let mut documents: Vec<Document> = decode_bodies(bodies)?;
    documents.retain(|doc| {
      let created = doc.version.created;
      query.created_from.is_none_or(|from| from <= created)
        && query.created_to.is_none_or(|to| created <= to)
    });
    if query.order == DocumentOrder::CreatedDesc {
      documents.sort_by(|a, b| b.version.created.cmp(&a.version.created));
    }

    debug!(subject_id, matched = documents.len(), ?query, "document query");
    Ok(documents)
  }

  async fn put_document(&self, document: Document) -> Result<Document> {
    let body = encode_body(&document)?;
    self
      .write_record(RECORD_DOC, &document.subject_id, &document.id, body)
      .await?;
    Ok(document)
  }

  // ── Sheets ────────────────────────────────────────────────────────────────

  async fn list_sheets(&self, subject_id: &str, document_id: &str) -> Result<Vec<Sheet>> {
    let partition = subject_id.to_owned();
    let doc_id = document_id.to_owned();

    let bodies: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT body FROM documents
           WHERE subject_id = ?1 AND record_type = 'sheet'
             AND json_extract(body, '$.doc_id') = ?2
           ORDER BY json_extract(body, '$.number')",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![partition, doc_id], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;

    decode_bodies(bodies)
  }

  async fn find_sheet(
    &self,
    subject_id: &str,
    document_id: &str,
    number: u32,
  ) -> Result<Option<Sheet>> {
    let partition = subject_id.to_owned();
    let doc_id = document_id.to_owned();

    let body: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT body FROM documents
               WHERE subject_id = ?1 AND record_type = 'sheet'
                 AND json_extract(body, '$.doc_id') = ?2
                 AND json_extract(body, '$.number') = ?3
               LIMIT 1",
              rusqlite::params![partition, doc_id, number],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    body.as_deref().map(decode_body).transpose()
  }

  async fn get_sheet(&self, subject_id: &str, sheet_id: &str) -> Result<Sheet> {
    match self.read_record(RECORD_SHEET, subject_id, sheet_id).await? {
      Some(b) => decode_body(&b),
      None => Err(Error::NotFound {
        kind: "sheet",
        id:   sheet_id.to_owned(),
      }),
    }
  }

  async fn patch_sheet(
    &self,
    subject_id: &str,
    sheet_id: &str,
    ops: Vec<PatchOperation>,
  ) -> Result<Sheet> {
    let partition = subject_id.to_owned();
    let key = sheet_id.to_owned();
    let not_found = Error::NotFound {
      kind: "sheet",
      id:   sheet_id.to_owned(),
    };

    let outcome: Result<Sheet> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let body: Option<String> = tx
          .query_row(
            "SELECT body FROM documents
             WHERE subject_id = ?1 AND id = ?2 AND record_type = 'sheet'",
            rusqlite::params![partition, key],
            |row| row.get(0),
          )
          .optional()?;
        let Some(body) = body else {
          return Ok(Err(not_found));
        };
        let (sheet, patched) = match apply_patch::<Sheet>(&body, &ops) {
          Ok(v) => v,
          Err(e) => return Ok(Err(e)),
        };
        tx.execute(
          "UPDATE documents SET body = ?3 WHERE subject_id = ?1 AND id = ?2",
          rusqlite::params![partition, key, patched],
        )?;
        tx.commit()?;
        Ok(Ok(sheet))
      })
      .await?;

    outcome
  }

  async fn put_sheet(&self, sheet: Sheet) -> Result<Sheet> {
    let body = encode_body(&sheet)?;
    self
      .write_record(RECORD_SHEET, &sheet.subject_id, &sheet.id, body)
      .await?;
    Ok(sheet)
  }

  // ── Health ────────────────────────────────────────────────────────────────

  async fn ping(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
