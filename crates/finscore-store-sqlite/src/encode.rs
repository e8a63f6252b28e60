//! Encoding helpers between domain types and the JSON bodies stored in
//! SQLite, plus the read-modify-write step used by patch calls.

use finscore_core::patch::{PatchOperation, apply_all};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{Error, Result};

pub const RECORD_DOC: &str = "doc";
pub const RECORD_SHEET: &str = "sheet";

pub fn encode_body<T: Serialize>(record: &T) -> Result<String> {
  Ok(serde_json::to_string(record)?)
}

pub fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T> {
  Ok(serde_json::from_str(body)?)
}

pub fn decode_bodies<T: DeserializeOwned>(bodies: Vec<String>) -> Result<Vec<T>> {
  bodies.iter().map(|b| decode_body(b)).collect()
}

/// Case-insensitive substring match with Unicode case folding. `None`
/// matches everything.
pub fn contains_folded(haystack: &str, needle: Option<&str>) -> bool {
  needle.is_none_or(|n| haystack.to_lowercase().contains(&n.to_lowercase()))
}

/// Apply `ops` to a stored body and check the result still decodes as `T`.
///
/// Returns the decoded record and its new body. Nothing is written if any
/// operation fails.
pub fn apply_patch<T: DeserializeOwned>(
  body: &str,
  ops: &[PatchOperation],
) -> Result<(T, String)> {
  let mut value: Value = serde_json::from_str(body)?;
  apply_all(ops, &mut value)?;
  let record = serde_json::from_value(value.clone())
    .map_err(|e| Error::InvalidRecord(e.to_string()))?;
  Ok((record, value.to_string()))
}
