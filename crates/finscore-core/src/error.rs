//! Error types for `finscore-core`.

use thiserror::Error;

use crate::{peer::PeerError, store::StoreFailure};

#[derive(Debug, Error)]
pub enum Error {
  /// A lookup or a local selection produced nothing.
  #[error("not found")]
  NotFound,

  /// A peer service answered with a non-2xx status or could not be reached.
  #[error("{message}")]
  Upstream { status: u16, message: String },

  /// The document store failed; `status` is the code the backend reported.
  #[error("store error: {source}")]
  Store {
    status: u16,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  /// A score document did not carry a numeric value in its final cell.
  #[error("malformed score document: {0}")]
  MalformedScore(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// Wrap a backend error, keeping the status code it reports.
  pub fn store<E: StoreFailure>(e: E) -> Self {
    Error::Store {
      status: e.status_code(),
      source: Box::new(e),
    }
  }

  /// HTTP-style status code associated with this failure.
  pub fn status_code(&self) -> u16 {
    match self {
      Error::NotFound => 404,
      Error::Upstream { status, .. } => *status,
      Error::Store { status, .. } => *status,
      Error::MalformedScore(_) | Error::Serialization(_) => 500,
    }
  }
}

impl From<PeerError> for Error {
  fn from(e: PeerError) -> Self {
    Error::Upstream {
      status:  e.status,
      message: e.message,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
