//! Liveness and readiness probes.

use axum::{Json, extract::State};
use finscore_core::{Error, store::DocumentStore};
use serde_json::{Value, json};

use crate::{AppState, error::ApiError};

/// `GET /probe/liveness`
pub async fn liveness() -> Json<Value> { Json(json!({ "detail": "OK" })) }

/// `GET /probe/readiness` fails with the store's status if it cannot be
/// reached.
pub async fn readiness<S, P>(
  State(state): State<AppState<S, P>>,
) -> Result<Json<Value>, ApiError>
where
  S: DocumentStore,
{
  state.store.ping().await.map_err(Error::store)?;
  Ok(Json(json!({ "detail": "OK" })))
}
