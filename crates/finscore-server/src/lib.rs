//! finscore HTTP server: configuration, fixture seeding, and the
//! fully-layered application router.

pub mod seed;

use std::path::PathBuf;

use axum::Router;
use finscore_api::{AppState, api_router};
use finscore_core::{
  peer::{Peer, PeerEndpoints},
  store::DocumentStore,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Server configuration, read from a TOML file and `FINSCORE_*` environment
/// variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                    String,
  #[serde(default = "default_port")]
  pub port:                    u16,
  pub store_path:              PathBuf,
  #[serde(default = "default_online_data_service_url")]
  pub online_data_service_url: String,
  #[serde(default = "default_model_service_url")]
  pub model_service_url:       String,
  #[serde(default = "default_export_service_url")]
  pub export_service_url:      String,
  /// Per-request timeout for peer calls.
  #[serde(default = "default_peer_timeout_secs")]
  pub peer_timeout_secs:       u64,
}

fn default_host() -> String { "0.0.0.0".to_owned() }
fn default_port() -> u16 { 8080 }
fn default_online_data_service_url() -> String {
  "http://online-data-service/api/v1".to_owned()
}
fn default_model_service_url() -> String { "http://model-service/api/v1".to_owned() }
fn default_export_service_url() -> String { "http://export-service/api/v1".to_owned() }
fn default_peer_timeout_secs() -> u64 { 30 }

impl ServerConfig {
  pub fn endpoints(&self) -> PeerEndpoints {
    PeerEndpoints {
      online_data: self.online_data_service_url.clone(),
      model:       self.model_service_url.clone(),
      export:      self.export_service_url.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The API router wrapped in request tracing.
pub fn app<S, P>(state: AppState<S, P>) -> Router
where
  S: DocumentStore + 'static,
  P: Peer + 'static,
{
  api_router(state).layer(TraceLayer::new_for_http())
}
