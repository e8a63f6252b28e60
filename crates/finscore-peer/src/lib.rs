//! `reqwest`-backed implementation of [`finscore_core::peer::Peer`].

use std::time::Duration;

use finscore_core::peer::{CORRELATION_ID_HEADER, Peer, PeerError, PeerRequest};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

/// Status reported when a peer cannot be reached or answers with garbage.
const UNREACHABLE_STATUS: u16 = 502;

/// Async JSON POST client for peer services.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpPeer {
  client: Client,
}

impl HttpPeer {
  pub fn new(timeout: Duration) -> reqwest::Result<Self> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self { client })
  }
}

impl Peer for HttpPeer {
  async fn post_json(&self, request: PeerRequest) -> Result<Value, PeerError> {
    let mut builder = self
      .client
      .post(&request.url)
      .query(&request.query)
      .json(&request.body);
    if let Some(id) = &request.correlation_id {
      builder = builder.header(CORRELATION_ID_HEADER, id);
    }

    debug!(url = %request.url, correlation_id = ?request.correlation_id, "peer POST");
    let resp = builder.send().await.map_err(|e| PeerError {
      status:  UNREACHABLE_STATUS,
      message: format!("Request to {} failed: {e}", request.url),
    })?;

    let status = resp.status();
    if !status.is_success() {
      return Err(PeerError {
        status:  status.as_u16(),
        message: format!(
          "Request to {} failed: {}",
          request.url,
          status.canonical_reason().unwrap_or("Unknown Status")
        ),
      });
    }

    resp.json().await.map_err(|e| PeerError {
      status:  UNREACHABLE_STATUS,
      message: format!("Request to {} returned an unreadable body: {e}", request.url),
    })
  }
}

#[cfg(test)]
mod tests {
  use axum::{
    Json, Router,
    extract::Query,
    http::{HeaderMap, StatusCode},
    routing::post,
  };
  use serde_json::json;
  use std::collections::HashMap;
  use tokio::net::TcpListener;

  use super::*;

  /// Serve a tiny peer on an ephemeral port and return its base URL.
  async fn spawn_peer() -> String {
    let app = Router::new()
      .route(
        "/echo",
        post(
          |headers: HeaderMap,
           Query(query): Query<HashMap<String, String>>,
           Json(body): Json<Value>| async move {
            let correlation = headers
              .get(CORRELATION_ID_HEADER)
              .and_then(|v| v.to_str().ok())
              .map(str::to_owned);
            Json(json!({"body": body, "query": query, "correlation_id": correlation}))
          },
        ),
      )
      .route("/down", post(|| async { StatusCode::SERVICE_UNAVAILABLE }))
      .route("/text", post(|| async { "not json" }));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}")
  }

  fn peer() -> HttpPeer { HttpPeer::new(Duration::from_secs(5)).unwrap() }

  #[tokio::test]
  async fn posts_body_query_and_correlation_id() {
    let base = spawn_peer().await;
    let request = PeerRequest::new(format!("{base}/echo"), json!({"a": 1}))
      .query("subject_id", "S1")
      .correlation_id(Some("corr-7"));

    let resp = peer().post_json(request).await.unwrap();
    assert_eq!(resp["body"], json!({"a": 1}));
    assert_eq!(resp["query"]["subject_id"], "S1");
    assert_eq!(resp["correlation_id"], "corr-7");
  }

  #[tokio::test]
  async fn missing_correlation_id_sends_no_header() {
    let base = spawn_peer().await;
    let resp = peer()
      .post_json(PeerRequest::new(format!("{base}/echo"), json!({})))
      .await
      .unwrap();
    assert_eq!(resp["correlation_id"], Value::Null);
  }

  #[tokio::test]
  async fn non_2xx_carries_upstream_status() {
    let base = spawn_peer().await;
    let url = format!("{base}/down");
    let err = peer()
      .post_json(PeerRequest::new(url.clone(), json!({})))
      .await
      .unwrap_err();
    assert_eq!(err.status, 503);
    assert_eq!(err.message, format!("Request to {url} failed: Service Unavailable"));
  }

  #[tokio::test]
  async fn non_json_body_is_502() {
    let base = spawn_peer().await;
    let err = peer()
      .post_json(PeerRequest::new(format!("{base}/text"), json!({})))
      .await
      .unwrap_err();
    assert_eq!(err.status, 502);
  }

  #[tokio::test]
  async fn unreachable_peer_is_502() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = peer()
      .post_json(PeerRequest::new(format!("http://{addr}/x"), json!({})))
      .await
      .unwrap_err();
    assert_eq!(err.status, 502);
  }
}
