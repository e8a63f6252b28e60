//! Outbound calls to peer services (data refresh, scoring, export).

use std::future::Future;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Header carrying the caller's correlation id to every peer call.
pub const CORRELATION_ID_HEADER: &str = "Correlation-Id";

/// A failed peer call: the peer's status, or 502 when it could not be reached.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct PeerError {
  pub status:  u16,
  pub message: String,
}

/// A JSON POST to a peer.
#[derive(Debug, Clone, PartialEq)]
pub struct PeerRequest {
  pub url:            String,
  pub query:          Vec<(String, String)>,
  pub body:           Value,
  pub correlation_id: Option<String>,
}

impl PeerRequest {
  pub fn new(url: impl Into<String>, body: Value) -> Self {
    Self {
      url: url.into(),
      query: Vec::new(),
      body,
      correlation_id: None,
    }
  }

  pub fn query(mut self, key: &str, value: impl ToString) -> Self {
    self.query.push((key.to_owned(), value.to_string()));
    self
  }

  pub fn correlation_id(mut self, id: Option<&str>) -> Self {
    self.correlation_id = id.map(str::to_owned);
    self
  }
}

/// Abstraction over the outbound HTTP client.
pub trait Peer: Send + Sync {
  /// POST `request.body` and return the decoded JSON response. Any non-2xx
  /// answer is a [`PeerError`] carrying the upstream status.
  fn post_json(
    &self,
    request: PeerRequest,
  ) -> impl Future<Output = Result<Value, PeerError>> + Send + '_;
}

/// Base URLs of the peer services.
#[derive(Debug, Clone, Deserialize)]
pub struct PeerEndpoints {
  pub online_data: String,
  pub model:       String,
  pub export:      String,
}

impl PeerEndpoints {
  /// Data refresh for one document type.
  pub fn refresh(&self, doc_type: &str) -> String {
    format!("{}/mfcr/{doc_type}", self.online_data.trim_end_matches('/'))
  }

  pub fn score(&self) -> String { format!("{}/score", self.model.trim_end_matches('/')) }

  pub fn export(&self, export_id: &str) -> String {
    format!("{}/export/{export_id}", self.export.trim_end_matches('/'))
  }
}
