//! Data refresh fan-out to the online-data peer.
//!
//! One POST per document type. A failing type is recorded in the result map
//! and never stops the remaining types from being attempted.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::peer::{Peer, PeerEndpoints, PeerRequest};

/// Top-layer document types refreshed when the caller names none.
pub const DEFAULT_REFRESH_TYPES: [&str; 4] = ["001", "002", "003", "080"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshOutcome {
  pub status: u16,
  pub detail: Value,
}

/// Ask the online-data peer to refresh `doc_type` (or every default type)
/// for a subject.
pub async fn refresh_documents<P: Peer>(
  peer: &P,
  endpoints: &PeerEndpoints,
  subject_id: &str,
  doc_type: Option<&str>,
  period: Option<NaiveDate>,
  correlation_id: Option<&str>,
) -> BTreeMap<String, RefreshOutcome> {
  let doc_types: Vec<&str> = match doc_type {
    Some(t) => vec![t],
    None => DEFAULT_REFRESH_TYPES.to_vec(),
  };

  let mut results = BTreeMap::new();
  for doc_type in doc_types {
    let mut request = PeerRequest::new(endpoints.refresh(doc_type), json!({}))
      .query("subject_id", subject_id)
      .correlation_id(correlation_id);
    if let Some(period) = period {
      request = request.query("period", period);
    }

    let outcome = match peer.post_json(request).await {
      Ok(detail) => {
        info!(subject_id, doc_type, "document refresh accepted");
        RefreshOutcome { status: 200, detail }
      }
      Err(e) => {
        warn!(subject_id, doc_type, status = e.status, error = %e, "document refresh failed");
        RefreshOutcome {
          status: e.status,
          detail: Value::String(e.message),
        }
      }
    };
    results.insert(doc_type.to_owned(), outcome);
  }
  results
}
