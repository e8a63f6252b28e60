//! The `DocumentStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `finscore-store-sqlite`).
//! Every record lives in a partition keyed by subject id; there are no
//! cross-partition queries.

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};

use crate::{
  document::Document,
  patch::PatchOperation,
  sheet::Sheet,
  subject::{Subject, SubjectQuery},
};

/// Errors raised by a [`DocumentStore`] backend.
pub trait StoreFailure: std::error::Error + Send + Sync + 'static {
  /// HTTP-style status reported by the backend: 404 for a missing row,
  /// 409 for a duplicate create, 400 for a rejected patch, 500 otherwise.
  fn status_code(&self) -> u16;
}

// ─── Query type ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DocumentOrder {
  /// Most recent reporting period first.
  #[default]
  PeriodDesc,
  /// Most recently created version first.
  CreatedDesc,
}

/// Parameters for [`DocumentStore::query_documents`]. Unset fields do not
/// filter.
#[derive(Debug, Clone, Default)]
pub struct DocumentQuery {
  pub type_key:     Option<String>,
  pub layer:        Option<i32>,
  /// Inclusive lower bound on `period`.
  pub min_period:   Option<NaiveDate>,
  /// Inclusive bounds on `version.created`.
  pub created_from: Option<DateTime<Utc>>,
  pub created_to:   Option<DateTime<Utc>>,
  pub order:        DocumentOrder,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a partitioned document store.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait DocumentStore: Send + Sync {
  type Error: StoreFailure;

  // ── Subjects ──────────────────────────────────────────────────────────

  fn search_subjects<'a>(
    &'a self,
    query: &'a SubjectQuery,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + 'a;

  fn get_subject<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + 'a;

  /// Insert a new subject. Fails with a 409 if the id is taken.
  fn create_subject(
    &self,
    subject: Subject,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + '_;

  /// Apply `ops` to a subject atomically and return the result.
  fn patch_subject<'a>(
    &'a self,
    id: &'a str,
    ops: Vec<PatchOperation>,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + 'a;

  /// Remove the subject row. Documents in its partition are left alone.
  fn delete_subject<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Documents ─────────────────────────────────────────────────────────

  fn list_documents<'a>(
    &'a self,
    subject_id: &'a str,
  ) -> impl Future<Output = Result<Vec<Document>, Self::Error>> + Send + 'a;

  fn get_document<'a>(
    &'a self,
    subject_id: &'a str,
    document_id: &'a str,
  ) -> impl Future<Output = Result<Document, Self::Error>> + Send + 'a;

  fn query_documents<'a>(
    &'a self,
    subject_id: &'a str,
    query: &'a DocumentQuery,
  ) -> impl Future<Output = Result<Vec<Document>, Self::Error>> + Send + 'a;

  /// Insert or replace a document. Used by ingestion and fixtures.
  fn put_document(
    &self,
    document: Document,
  ) -> impl Future<Output = Result<Document, Self::Error>> + Send + '_;

  // ── Sheets ────────────────────────────────────────────────────────────

  /// All sheets of a document, ordered by number.
  fn list_sheets<'a>(
    &'a self,
    subject_id: &'a str,
    document_id: &'a str,
  ) -> impl Future<Output = Result<Vec<Sheet>, Self::Error>> + Send + 'a;

  /// The sheet of a document with the given number, if any.
  fn find_sheet<'a>(
    &'a self,
    subject_id: &'a str,
    document_id: &'a str,
    number: u32,
  ) -> impl Future<Output = Result<Option<Sheet>, Self::Error>> + Send + 'a;

  /// Point read of a sheet by id.
  fn get_sheet<'a>(
    &'a self,
    subject_id: &'a str,
    sheet_id: &'a str,
  ) -> impl Future<Output = Result<Sheet, Self::Error>> + Send + 'a;

  fn patch_sheet<'a>(
    &'a self,
    subject_id: &'a str,
    sheet_id: &'a str,
    ops: Vec<PatchOperation>,
  ) -> impl Future<Output = Result<Sheet, Self::Error>> + Send + 'a;

  /// Insert or replace a sheet. Used by ingestion and fixtures.
  fn put_sheet(
    &self,
    sheet: Sheet,
  ) -> impl Future<Output = Result<Sheet, Self::Error>> + Send + '_;

  // ── Health ────────────────────────────────────────────────────────────

  fn ping(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
