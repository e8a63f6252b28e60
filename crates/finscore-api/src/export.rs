//! `POST /export/{export_id}`: forwards a date range to the export peer.

use axum::{
  Json,
  extract::State,
};
use chrono::{DateTime, Utc};
use finscore_core::{
  Error,
  peer::{Peer, PeerRequest},
  time::deserialize_optional_timestamp,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
  AppState,
  correlation::CorrelationId,
  error::ApiError,
  extract::{OptionalJsonBody, PathParams},
};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ExportBody {
  #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
  pub date_from: Option<DateTime<Utc>>,
  #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
  pub date_to:   Option<DateTime<Utc>>,
}

/// Responds `{"detail": <peer response>}`.
pub async fn trigger<S, P>(
  State(state): State<AppState<S, P>>,
  PathParams(export_id): PathParams<String>,
  correlation_id: CorrelationId,
  OptionalJsonBody(body): OptionalJsonBody<ExportBody>,
) -> Result<Json<Value>, ApiError>
where
  P: Peer,
{
  let request = PeerRequest::new(
    state.endpoints.export(&export_id),
    serde_json::to_value(&body).map_err(Error::from)?,
  )
  .correlation_id(correlation_id.as_deref());

  let result = state.peer.post_json(request).await.map_err(Error::from)?;
  tracing::info!(export_id, "export triggered");
  Ok(Json(json!({ "detail": result })))
}
