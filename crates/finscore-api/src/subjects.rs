//! Handlers for `/subject` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/subject` | `?ic=&name=&include_not_active=` substring search |
//! | `POST`   | `/subject` | Body: full subject; 409 if the id is taken |
//! | `GET`    | `/subject/{subject_id}` | 404 if not found |
//! | `PATCH`  | `/subject/{subject_id}` | Only supplied fields are written |
//! | `DELETE` | `/subject/{subject_id}` | Documents are not removed |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use finscore_core::{
  Error,
  store::DocumentStore,
  subject::{Subject, SubjectPatch, SubjectQuery},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
  AppState,
  error::ApiError,
  extract::{JsonBody, PathParams, QueryParams},
};

// ─── Search ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  pub ic:                 Option<String>,
  pub name:               Option<String>,
  #[serde(default)]
  pub include_not_active: bool,
}

/// `GET /subject[?ic=..][&name=..][&include_not_active=true]`
pub async fn search<S, P>(
  State(state): State<AppState<S, P>>,
  QueryParams(params): QueryParams<SearchParams>,
) -> Result<Json<Vec<Subject>>, ApiError>
where
  S: DocumentStore,
{
  let query = SubjectQuery {
    ic:               params.ic,
    name:             params.name,
    include_inactive: params.include_not_active,
  };
  let subjects = state
    .store
    .search_subjects(&query)
    .await
    .map_err(Error::store)?;
  Ok(Json(subjects))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /subject`
pub async fn create<S, P>(
  State(state): State<AppState<S, P>>,
  JsonBody(subject): JsonBody<Subject>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore,
{
  let subject = state
    .store
    .create_subject(subject)
    .await
    .map_err(Error::store)?;
  Ok((StatusCode::CREATED, Json(subject)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /subject/{subject_id}`
pub async fn get_one<S, P>(
  State(state): State<AppState<S, P>>,
  PathParams(subject_id): PathParams<String>,
) -> Result<Json<Subject>, ApiError>
where
  S: DocumentStore,
{
  let subject = state
    .store
    .get_subject(&subject_id)
    .await
    .map_err(Error::store)?;
  Ok(Json(subject))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /subject/{subject_id}`. Body: any subset of the mutable fields.
pub async fn update<S, P>(
  State(state): State<AppState<S, P>>,
  PathParams(subject_id): PathParams<String>,
  JsonBody(patch): JsonBody<SubjectPatch>,
) -> Result<Json<Subject>, ApiError>
where
  S: DocumentStore,
{
  let store = &state.store;
  let subject = if patch.is_empty() {
    store.get_subject(&subject_id).await
  } else {
    store.patch_subject(&subject_id, patch.operations()).await
  }
  .map_err(Error::store)?;
  Ok(Json(subject))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /subject/{subject_id}`
pub async fn delete<S, P>(
  State(state): State<AppState<S, P>>,
  PathParams(subject_id): PathParams<String>,
) -> Result<Json<Value>, ApiError>
where
  S: DocumentStore,
{
  state
    .store
    .delete_subject(&subject_id)
    .await
    .map_err(Error::store)?;
  tracing::info!(subject_id, "subject deleted");
  Ok(Json(json!({ "detail": "OK" })))
}
