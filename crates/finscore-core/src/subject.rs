//! Subject: the party whose financial documents are stored and scored.
//!
//! Subjects live in their own partition; the subject `id` doubles as the
//! partition key for every document and sheet that belongs to it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::patch::PatchOperation;

/// A postal address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
  pub region: String,
  pub street: String,
  pub zip:    String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
  /// Registration number; also the partition key.
  pub id:       String,
  pub name:     String,
  pub address:  Address,
  /// ISO 4217 code the subject reports in.
  pub currency: String,
  pub created:  NaiveDate,
  pub updated:  NaiveDate,
  #[serde(default = "default_active")]
  pub active:   bool,
  #[serde(default)]
  pub extra:    Option<String>,
}

fn default_active() -> bool { true }

// ─── Search ──────────────────────────────────────────────────────────────────

/// Parameters for [`crate::store::DocumentStore::search_subjects`].
///
/// Patterns are matched case-insensitively as substrings; an absent pattern
/// matches everything.
#[derive(Debug, Clone, Default)]
pub struct SubjectQuery {
  pub ic:               Option<String>,
  pub name:             Option<String>,
  /// If `false`, only subjects with `active = true` are returned.
  pub include_inactive: bool,
}

// ─── Partial update ──────────────────────────────────────────────────────────

/// A partial update to a [`Subject`]. Only `Some` fields are written.
///
/// `active: Some(false)` is an explicit deactivation and is applied like any
/// other supplied value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectPatch {
  pub name:     Option<String>,
  pub address:  Option<Address>,
  pub currency: Option<String>,
  pub active:   Option<bool>,
  pub extra:    Option<String>,
}

impl SubjectPatch {
  pub fn is_empty(&self) -> bool { self.operations().is_empty() }

  /// The store patch operations for the supplied fields, in a stable order.
  pub fn operations(&self) -> Vec<PatchOperation> {
    let mut ops = Vec::new();
    if let Some(name) = &self.name {
      ops.push(PatchOperation::set("/name", json!(name)));
    }
    if let Some(address) = &self.address {
      ops.push(PatchOperation::set("/address/region", json!(address.region)));
      ops.push(PatchOperation::set("/address/street", json!(address.street)));
      ops.push(PatchOperation::set("/address/zip", json!(address.zip)));
    }
    if let Some(currency) = &self.currency {
      ops.push(PatchOperation::set("/currency", json!(currency)));
    }
    if let Some(active) = self.active {
      ops.push(PatchOperation::set("/active", json!(active)));
    }
    if let Some(extra) = &self.extra {
      ops.push(PatchOperation::set("/extra", json!(extra)));
    }
    ops
  }
}
