//! Score aggregation and selection.
//!
//! [`trigger_score`] gathers a subject's recent top-layer documents, keeps
//! at most [`MAX_PERIODS_PER_TYPE`] distinct periods per document type
//! inside a [`SCORING_WINDOW_YEARS`] window, hydrates their sheets, and posts
//! the bundle to the scoring peer. The score itself is always the value in
//! the final row and final column of a score document's first sheet.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::{
  Error, Result,
  document::{Document, FullDocument},
  peer::{Peer, PeerEndpoints, PeerRequest},
  sheet::Sheet,
  store::{DocumentOrder, DocumentQuery, DocumentStore},
};

/// Type key of the documents produced by the scoring peer.
pub const SCORE_DOCUMENT_TYPE: &str = "FC";
/// Layer whose documents feed the scoring peer.
pub const SCORING_LAYER: i32 = 1;
pub const MAX_PERIODS_PER_TYPE: usize = 3;
pub const SCORING_WINDOW_YEARS: i32 = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
  pub created: DateTime<Utc>,
  pub period:  NaiveDate,
  pub score:   f64,
}

// ─── Selection ───────────────────────────────────────────────────────────────

/// Earliest period eligible for scoring: 31 December, four years before
/// `today`'s year.
pub fn scoring_window_start(today: NaiveDate) -> NaiveDate {
  NaiveDate::from_ymd_opt(today.year() - SCORING_WINDOW_YEARS, 12, 31)
    .unwrap_or(NaiveDate::MIN)
}

/// Tracks which periods have been taken per document type.
///
/// Feed documents newest period first; the first [`MAX_PERIODS_PER_TYPE`]
/// distinct periods of each type are accepted.
#[derive(Debug)]
pub struct PeriodSelector {
  window_start: NaiveDate,
  selected:     HashMap<String, BTreeSet<NaiveDate>>,
}

impl PeriodSelector {
  pub fn new(window_start: NaiveDate) -> Self {
    Self {
      window_start,
      selected: HashMap::new(),
    }
  }

  pub fn accept(&mut self, document: &Document) -> bool {
    if document.period < self.window_start {
      return false;
    }
    let periods = self.selected.entry(document.doc_type.key.clone()).or_default();
    if periods.contains(&document.period) || periods.len() >= MAX_PERIODS_PER_TYPE {
      return false;
    }
    periods.insert(document.period)
  }
}

/// Pick the documents to send to the scoring peer.
///
/// The input is ordered by period descending (stable, so store order breaks
/// ties) before the per-type cap is applied; the kept periods are therefore
/// always the most recent ones.
pub fn select_for_scoring(
  documents: impl IntoIterator<Item = Document>,
  window_start: NaiveDate,
) -> Vec<Document> {
  let mut documents: Vec<Document> = documents.into_iter().collect();
  documents.sort_by(|a, b| b.period.cmp(&a.period));

  let mut selector = PeriodSelector::new(window_start);
  documents
    .into_iter()
    .filter(|doc| {
      let keep = selector.accept(doc);
      debug!(
        document = %doc.id,
        doc_type = %doc.doc_type.key,
        period = %doc.period,
        keep,
        "score input selection"
      );
      keep
    })
    .collect()
}

// ─── Extraction ──────────────────────────────────────────────────────────────

/// The numeric value in the final row, final column of `sheet`.
pub fn extract_score(sheet: &Sheet) -> Result<f64> {
  let cell = sheet.last_cell().ok_or_else(|| {
    Error::MalformedScore(format!("sheet {} has an empty grid", sheet.id))
  })?;
  cell.as_number().ok_or_else(|| {
    Error::MalformedScore(format!(
      "sheet {} ends with a non-numeric cell: {cell:?}",
      sheet.id
    ))
  })
}

/// Summarise a score document returned by the scoring peer.
pub fn summarize(document: &FullDocument) -> Result<ScoreSummary> {
  let sheet = document.sheets.first().ok_or_else(|| {
    Error::MalformedScore(format!("document {} has no sheets", document.id))
  })?;
  Ok(ScoreSummary {
    created: document.version.created,
    period:  document.period,
    score:   extract_score(sheet)?,
  })
}

// ─── Workflows ───────────────────────────────────────────────────────────────

async fn hydrate<S: DocumentStore>(
  store: &S,
  subject_id: &str,
  document: Document,
) -> Result<FullDocument> {
  let sheets = try_join_all(
    document
      .sheets
      .iter()
      .map(|sheet| store.get_sheet(subject_id, &sheet.id)),
  )
  .await
  .map_err(Error::store)?;
  Ok(document.into_full(sheets))
}

/// Run a scoring round for `subject_id` and return the resulting summary.
///
/// Fails [`Error::NotFound`] without calling the peer when no document is
/// eligible.
pub async fn trigger_score<S, P>(
  store: &S,
  peer: &P,
  endpoints: &PeerEndpoints,
  subject_id: &str,
  today: NaiveDate,
  correlation_id: Option<&str>,
) -> Result<ScoreSummary>
where
  S: DocumentStore,
  P: Peer,
{
  let window_start = scoring_window_start(today);
  let query = DocumentQuery {
    layer: Some(SCORING_LAYER),
    min_period: Some(window_start),
    order: DocumentOrder::PeriodDesc,
    ..Default::default()
  };
  let candidates = store
    .query_documents(subject_id, &query)
    .await
    .map_err(Error::store)?;

  let selected = select_for_scoring(candidates, window_start);
  if selected.is_empty() {
    return Err(Error::NotFound);
  }

  let payload = try_join_all(
    selected
      .into_iter()
      .map(|doc| hydrate(store, subject_id, doc)),
  )
  .await?;
  info!(subject_id, documents = payload.len(), "requesting score");

  let request = PeerRequest::new(endpoints.score(), serde_json::to_value(&payload)?)
    .correlation_id(correlation_id);
  let response: Value = peer.post_json(request).await?;
  let result: FullDocument = serde_json::from_value(response)
    .map_err(|e| Error::MalformedScore(e.to_string()))?;

  let summary = summarize(&result)?;
  info!(subject_id, score = summary.score, period = %summary.period, "score computed");
  Ok(summary)
}

/// Past scores of a subject, most recently created first.
pub async fn score_history<S: DocumentStore>(
  store: &S,
  subject_id: &str,
  created_from: Option<DateTime<Utc>>,
  created_to: Option<DateTime<Utc>>,
) -> Result<Vec<ScoreSummary>> {
  let query = DocumentQuery {
    type_key: Some(SCORE_DOCUMENT_TYPE.to_owned()),
    created_from,
    created_to,
    order: DocumentOrder::CreatedDesc,
    ..Default::default()
  };
  let documents = store
    .query_documents(subject_id, &query)
    .await
    .map_err(Error::store)?;

  try_join_all(documents.iter().map(|doc| async move {
    let first = doc.sheets.first().ok_or_else(|| {
      Error::MalformedScore(format!("score document {} has no sheets", doc.id))
    })?;
    let sheet = store
      .get_sheet(subject_id, &first.id)
      .await
      .map_err(Error::store)?;
    Ok::<_, Error>(ScoreSummary {
      created: doc.version.created,
      period:  doc.period,
      score:   extract_score(&sheet)?,
    })
  }))
  .await
}

/// The newest entry of [`score_history`], or [`Error::NotFound`].
pub async fn most_recent_score<S: DocumentStore>(
  store: &S,
  subject_id: &str,
) -> Result<ScoreSummary> {
  score_history(store, subject_id, None, None)
    .await?
    .into_iter()
    .next()
    .ok_or(Error::NotFound)
}
