//! Handlers for `/subject/{subject_id}/score` endpoints.

use axum::{
  Json,
  extract::State,
};
use chrono::{DateTime, Utc};
use finscore_core::{
  peer::Peer,
  score::{ScoreSummary, most_recent_score, score_history, trigger_score},
  store::DocumentStore,
  time::deserialize_optional_timestamp,
};
use serde::Deserialize;

use crate::{
  AppState,
  correlation::CorrelationId,
  error::ApiError,
  extract::{PathParams, QueryParams},
};

/// `GET /subject/{subject_id}/score`, 404 when the subject was never scored.
pub async fn most_recent<S, P>(
  State(state): State<AppState<S, P>>,
  PathParams(subject_id): PathParams<String>,
) -> Result<Json<ScoreSummary>, ApiError>
where
  S: DocumentStore,
{
  let summary = most_recent_score(state.store.as_ref(), &subject_id).await?;
  Ok(Json(summary))
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
  #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
  pub date_from: Option<DateTime<Utc>>,
  #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
  pub date_to:   Option<DateTime<Utc>>,
}

/// `GET /subject/{subject_id}/score/history[?date_from=..][&date_to=..]`
pub async fn history<S, P>(
  State(state): State<AppState<S, P>>,
  PathParams(subject_id): PathParams<String>,
  QueryParams(params): QueryParams<HistoryParams>,
) -> Result<Json<Vec<ScoreSummary>>, ApiError>
where
  S: DocumentStore,
{
  let history = score_history(
    state.store.as_ref(),
    &subject_id,
    params.date_from,
    params.date_to,
  )
  .await?;
  Ok(Json(history))
}

/// `POST /subject/{subject_id}/score`
pub async fn trigger<S, P>(
  State(state): State<AppState<S, P>>,
  PathParams(subject_id): PathParams<String>,
  correlation_id: CorrelationId,
) -> Result<Json<ScoreSummary>, ApiError>
where
  S: DocumentStore,
  P: Peer,
{
  let summary = trigger_score(
    state.store.as_ref(),
    state.peer.as_ref(),
    &state.endpoints,
    &subject_id,
    Utc::now().date_naive(),
    correlation_id.as_deref(),
  )
  .await?;
  Ok(Json(summary))
}
