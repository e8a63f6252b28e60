//! JSON REST API for finscore.
//!
//! Exposes an axum [`Router`] backed by any [`DocumentStore`] and [`Peer`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = finscore_api::api_router(state);   // serves /api/v1/...
//! ```

pub mod correlation;
pub mod documents;
pub mod error;
pub mod export;
pub mod extract;
pub mod probe;
pub mod scores;
pub mod subjects;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use finscore_core::{
  peer::{Peer, PeerEndpoints},
  store::DocumentStore,
};

pub use correlation::CorrelationId;
pub use error::ApiError;

/// Path prefix of every route.
pub const API_PREFIX: &str = "/api/v1";

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers. Built once per process.
pub struct AppState<S, P> {
  pub store:     Arc<S>,
  pub peer:      Arc<P>,
  pub endpoints: Arc<PeerEndpoints>,
}

impl<S, P> AppState<S, P> {
  pub fn new(store: S, peer: P, endpoints: PeerEndpoints) -> Self {
    Self {
      store:     Arc::new(store),
      peer:      Arc::new(peer),
      endpoints: Arc::new(endpoints),
    }
  }
}

impl<S, P> Clone for AppState<S, P> {
  fn clone(&self) -> Self {
    Self {
      store:     Arc::clone(&self.store),
      peer:      Arc::clone(&self.peer),
      endpoints: Arc::clone(&self.endpoints),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`, rooted at
/// [`API_PREFIX`].
pub fn api_router<S, P>(state: AppState<S, P>) -> Router<()>
where
  S: DocumentStore + 'static,
  P: Peer + 'static,
{
  let routes = Router::new()
    // Probes
    .route("/probe/liveness", get(probe::liveness))
    .route("/probe/readiness", get(probe::readiness::<S, P>))
    // Subjects
    .route(
      "/subject",
      get(subjects::search::<S, P>).post(subjects::create::<S, P>),
    )
    .route(
      "/subject/{subject_id}",
      get(subjects::get_one::<S, P>)
        .patch(subjects::update::<S, P>)
        .delete(subjects::delete::<S, P>),
    )
    // Documents
    .route("/subject/{subject_id}/document", get(documents::list::<S, P>))
    .route(
      "/subject/{subject_id}/document/refresh",
      post(documents::refresh::<S, P>),
    )
    .route(
      "/subject/{subject_id}/document/{document_id}",
      get(documents::get_one::<S, P>),
    )
    .route(
      "/subject/{subject_id}/document/{document_id}/sheet",
      get(documents::list_sheets::<S, P>),
    )
    .route(
      "/subject/{subject_id}/document/{document_id}/sheet/{sheet_num}",
      get(documents::get_sheet::<S, P>).patch(documents::patch_sheet::<S, P>),
    )
    // Scores
    .route(
      "/subject/{subject_id}/score",
      get(scores::most_recent::<S, P>).post(scores::trigger::<S, P>),
    )
    .route("/subject/{subject_id}/score/history", get(scores::history::<S, P>))
    // Export
    .route("/export/{export_id}", post(export::trigger::<S, P>))
    .with_state(state);

  Router::new().nest(API_PREFIX, routes)
}
