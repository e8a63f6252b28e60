//! Sheets: grid-shaped payloads belonging to a document.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{document::SheetRef, patch::PatchOperation};

/// A single grid cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
  Null,
  Bool(bool),
  Number(f64),
  Text(String),
}

impl CellValue {
  pub fn as_number(&self) -> Option<f64> {
    match self {
      Self::Number(n) => Some(*n),
      _ => None,
    }
  }

  fn to_json(&self) -> Value {
    match self {
      Self::Null => Value::Null,
      Self::Bool(b) => Value::Bool(*b),
      Self::Number(n) => serde_json::Number::from_f64(*n)
        .map(Value::Number)
        .unwrap_or(Value::Null),
      Self::Text(s) => Value::String(s.clone()),
    }
  }
}

impl From<f64> for CellValue {
  fn from(n: f64) -> Self { Self::Number(n) }
}

impl From<bool> for CellValue {
  fn from(b: bool) -> Self { Self::Bool(b) }
}

impl From<&str> for CellValue {
  fn from(s: &str) -> Self { Self::Text(s.to_owned()) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
  pub id:         String,
  pub subject_id: String,
  pub doc_id:     String,
  pub name:       String,
  /// Ordinal within the owning document.
  pub number:     u32,
  pub items:      Vec<Vec<CellValue>>,
}

impl Sheet {
  pub fn reference(&self) -> SheetRef {
    SheetRef {
      id:     self.id.clone(),
      name:   self.name.clone(),
      number: self.number,
    }
  }

  /// The cell in the final column of the final row.
  pub fn last_cell(&self) -> Option<&CellValue> { self.items.last()?.last() }
}

/// A coordinate-addressed cell write, as accepted by the sheet patch route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetCell {
  pub row_num: usize,
  pub col_num: usize,
  pub value:   CellValue,
}

impl SheetCell {
  pub fn to_operation(&self) -> PatchOperation {
    PatchOperation::set(
      format!("/items/{}/{}", self.row_num, self.col_num),
      self.value.to_json(),
    )
  }
}
