//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every failure is rendered as `{"detail": <text>}` with the status code of
//! whichever layer produced it.

use axum::{
  Json,
  extract::rejection::{BytesRejection, JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found")]
  NotFound,

  /// A peer answered non-2xx; `message` is shown to the caller.
  #[error("upstream error ({status}): {message}")]
  Upstream { status: StatusCode, message: String },

  /// The store failed; only the reason phrase of `status` is shown.
  #[error("store error ({status}): {source}")]
  Store {
    status: StatusCode,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  /// The request could not be extracted; `message` is the extractor's text.
  #[error("rejected request ({status}): {message}")]
  Rejected { status: StatusCode, message: String },

  #[error("internal error: {0}")]
  Internal(String),
}

macro_rules! from_rejection {
  ($($rejection:ty),* $(,)?) => {
    $(
      impl From<$rejection> for ApiError {
        fn from(r: $rejection) -> Self {
          ApiError::Rejected {
            status:  r.status(),
            message: r.body_text(),
          }
        }
      }
    )*
  };
}

from_rejection!(BytesRejection, JsonRejection, PathRejection, QueryRejection);

impl From<finscore_core::Error> for ApiError {
  fn from(e: finscore_core::Error) -> Self {
    use finscore_core::Error as Core;
    match e {
      Core::NotFound => ApiError::NotFound,
      Core::Upstream { status, message } => ApiError::Upstream {
        status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
        message,
      },
      Core::Store { status, source } => ApiError::Store {
        status: StatusCode::from_u16(status)
          .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        source,
      },
      other @ (Core::MalformedScore(_) | Core::Serialization(_)) => {
        ApiError::Internal(other.to_string())
      }
    }
  }
}

fn reason(status: StatusCode) -> String {
  status.canonical_reason().unwrap_or("Error").to_owned()
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, detail) = match &self {
      ApiError::NotFound => {
        tracing::info!("{self}");
        (StatusCode::NOT_FOUND, reason(StatusCode::NOT_FOUND))
      }
      ApiError::Upstream { status, message } => {
        tracing::warn!("{self}");
        (*status, message.clone())
      }
      ApiError::Store { status, .. } => {
        if status.is_server_error() {
          tracing::error!("{self}");
        } else {
          tracing::info!("{self}");
        }
        (*status, reason(*status))
      }
      ApiError::Rejected { status, message } => {
        tracing::info!("{self}");
        (*status, message.clone())
      }
      ApiError::Internal(_) => {
        tracing::error!("{self}");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          reason(StatusCode::INTERNAL_SERVER_ERROR),
        )
      }
    };
    (status, Json(json!({ "detail": detail }))).into_response()
  }
}
