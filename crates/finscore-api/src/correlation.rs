//! `Correlation-Id` request header extractor.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use finscore_core::peer::CORRELATION_ID_HEADER;

/// The caller's `Correlation-Id`, forwarded unchanged to peer calls.
/// Absent (or non-ASCII) headers extract as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrelationId(pub Option<String>);

impl CorrelationId {
  pub fn as_deref(&self) -> Option<&str> { self.0.as_deref() }
}

impl<S: Send + Sync> FromRequestParts<S> for CorrelationId {
  type Rejection = Infallible;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    let id = parts
      .headers
      .get(CORRELATION_ID_HEADER)
      .and_then(|v| v.to_str().ok())
      .map(str::to_owned);
    Ok(Self(id))
  }
}
