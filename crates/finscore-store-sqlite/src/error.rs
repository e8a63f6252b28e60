//! Error type for `finscore-store-sqlite`.

use finscore_core::{patch::PatchError, store::StoreFailure};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("patch rejected: {0}")]
  Patch(#[from] PatchError),

  /// A patch produced a record that no longer matches its schema.
  #[error("patched record is invalid: {0}")]
  InvalidRecord(String),

  #[error("{kind} not found: {id}")]
  NotFound { kind: &'static str, id: String },

  #[error("{kind} already exists: {id}")]
  Conflict { kind: &'static str, id: String },
}

impl StoreFailure for Error {
  fn status_code(&self) -> u16 {
    match self {
      Error::NotFound { .. } => 404,
      Error::Conflict { .. } => 409,
      Error::Patch(_) | Error::InvalidRecord(_) => 400,
      Error::Database(_) | Error::Json(_) => 500,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
