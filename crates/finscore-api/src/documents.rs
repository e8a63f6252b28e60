//! Handlers for `/subject/{subject_id}/document` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `.../document` | Every document of the subject |
//! | `POST`  | `.../document/refresh` | Body (may be empty): `{"doc_type"?, "period"?}` |
//! | `GET`   | `.../document/{document_id}` | 404 if not found |
//! | `GET`   | `.../document/{document_id}/sheet` | Ordered by sheet number |
//! | `GET`   | `.../document/{document_id}/sheet/{sheet_num}` | 404 if no such number |
//! | `PATCH` | `.../document/{document_id}/sheet/{sheet_num}` | Body: cell list; rescoring follows |
//!
//! A sheet patch is followed by a scoring round for the subject. If that
//! round fails the request fails, even though the cells were already written.

use std::collections::BTreeMap;

use axum::{
  Json,
  extract::State,
};
use chrono::{NaiveDate, Utc};
use finscore_core::{
  Error,
  document::Document,
  peer::Peer,
  refresh::{RefreshOutcome, refresh_documents},
  repository::{document_sheet, patch_sheet_cells},
  score::trigger_score,
  sheet::{Sheet, SheetCell},
  store::DocumentStore,
};
use serde::Deserialize;

use crate::{
  AppState,
  correlation::CorrelationId,
  error::ApiError,
  extract::{JsonBody, OptionalJsonBody, PathParams},
};

// ─── Documents ────────────────────────────────────────────────────────────────

/// `GET /subject/{subject_id}/document`
pub async fn list<S, P>(
  State(state): State<AppState<S, P>>,
  PathParams(subject_id): PathParams<String>,
) -> Result<Json<Vec<Document>>, ApiError>
where
  S: DocumentStore,
{
  let documents = state
    .store
    .list_documents(&subject_id)
    .await
    .map_err(Error::store)?;
  Ok(Json(documents))
}

/// `GET /subject/{subject_id}/document/{document_id}`
pub async fn get_one<S, P>(
  State(state): State<AppState<S, P>>,
  PathParams((subject_id, document_id)): PathParams<(String, String)>,
) -> Result<Json<Document>, ApiError>
where
  S: DocumentStore,
{
  let document = state
    .store
    .get_document(&subject_id, &document_id)
    .await
    .map_err(Error::store)?;
  Ok(Json(document))
}

// ─── Sheets ───────────────────────────────────────────────────────────────────

/// `GET /subject/{subject_id}/document/{document_id}/sheet`
pub async fn list_sheets<S, P>(
  State(state): State<AppState<S, P>>,
  PathParams((subject_id, document_id)): PathParams<(String, String)>,
) -> Result<Json<Vec<Sheet>>, ApiError>
where
  S: DocumentStore,
{
  let sheets = state
    .store
    .list_sheets(&subject_id, &document_id)
    .await
    .map_err(Error::store)?;
  Ok(Json(sheets))
}

/// `GET /subject/{subject_id}/document/{document_id}/sheet/{sheet_num}`
pub async fn get_sheet<S, P>(
  State(state): State<AppState<S, P>>,
  PathParams((subject_id, document_id, sheet_num)): PathParams<(String, String, u32)>,
) -> Result<Json<Sheet>, ApiError>
where
  S: DocumentStore,
{
  let sheet =
    document_sheet(state.store.as_ref(), &subject_id, &document_id, sheet_num).await?;
  Ok(Json(sheet))
}

/// `PATCH /subject/{subject_id}/document/{document_id}/sheet/{sheet_num}`
/// Body: `[{"row_num":0,"col_num":1,"value":12.5}, ...]`
pub async fn patch_sheet<S, P>(
  State(state): State<AppState<S, P>>,
  PathParams((subject_id, document_id, sheet_num)): PathParams<(String, String, u32)>,
  correlation_id: CorrelationId,
  JsonBody(cells): JsonBody<Vec<SheetCell>>,
) -> Result<Json<Sheet>, ApiError>
where
  S: DocumentStore,
  P: Peer,
{
  let store = state.store.as_ref();
  let sheet =
    patch_sheet_cells(store, &subject_id, &document_id, sheet_num, &cells).await?;

  trigger_score(
    store,
    state.peer.as_ref(),
    &state.endpoints,
    &subject_id,
    Utc::now().date_naive(),
    correlation_id.as_deref(),
  )
  .await?;

  Ok(Json(sheet))
}

// ─── Refresh ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct RefreshBody {
  /// Refresh only this document type; every default type when absent.
  pub doc_type: Option<String>,
  pub period:   Option<NaiveDate>,
}

/// `POST /subject/{subject_id}/document/refresh`
///
/// Always answers 200; per-type failures are reported inside the map.
pub async fn refresh<S, P>(
  State(state): State<AppState<S, P>>,
  PathParams(subject_id): PathParams<String>,
  correlation_id: CorrelationId,
  OptionalJsonBody(body): OptionalJsonBody<RefreshBody>,
) -> Json<BTreeMap<String, RefreshOutcome>>
where
  P: Peer,
{
  let results = refresh_documents(
    state.peer.as_ref(),
    &state.endpoints,
    &subject_id,
    body.doc_type.as_deref(),
    body.period,
    correlation_id.as_deref(),
  )
  .await;
  Json(results)
}
