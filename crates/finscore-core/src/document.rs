//! Financial documents.
//!
//! A document belongs to exactly one subject (its partition). Sheet bodies
//! are stored as separate records for size reasons; a [`Document`] carries
//! only lightweight [`SheetRef`]s, while a [`FullDocument`] embeds the sheets
//! themselves and is the shape exchanged with the scoring peer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::sheet::Sheet;

/// Classification of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentType {
  /// Type code, e.g. `"001"` for a balance sheet or `"FC"` for a score.
  pub key:   String,
  pub name:  String,
  /// Tier; layer 1 documents are the inputs to scoring.
  pub layer: i32,
  pub order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentVersion {
  pub version: u32,
  pub author:  String,
  #[serde(deserialize_with = "crate::time::deserialize_timestamp")]
  pub created: DateTime<Utc>,
}

/// Pointer from a document to one of its sheets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetRef {
  pub id:     String,
  pub name:   String,
  pub number: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
  pub id:         String,
  pub subject_id: String,
  #[serde(rename = "type")]
  pub doc_type:   DocumentType,
  /// Reporting period, typically a year end.
  pub period:     NaiveDate,
  pub version:    DocumentVersion,
  pub sheets:     Vec<SheetRef>,
}

impl Document {
  /// Replace the sheet references with the given bodies.
  pub fn into_full(self, sheets: Vec<Sheet>) -> FullDocument {
    FullDocument {
      id: self.id,
      subject_id: self.subject_id,
      doc_type: self.doc_type,
      period: self.period,
      version: self.version,
      sheets,
    }
  }
}

/// A [`Document`] with its sheet bodies embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullDocument {
  pub id:         String,
  pub subject_id: String,
  #[serde(rename = "type")]
  pub doc_type:   DocumentType,
  pub period:     NaiveDate,
  pub version:    DocumentVersion,
  pub sheets:     Vec<Sheet>,
}

impl FullDocument {
  /// Split back into a referencing [`Document`] and its sheet bodies.
  pub fn into_parts(self) -> (Document, Vec<Sheet>) {
    let refs = self.sheets.iter().map(Sheet::reference).collect();
    let doc = Document {
      id:         self.id,
      subject_id: self.subject_id,
      doc_type:   self.doc_type,
      period:     self.period,
      version:    self.version,
      sheets:     refs,
    };
    (doc, self.sheets)
  }
}
