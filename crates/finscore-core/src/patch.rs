//! Partial-update operations applied by the document store.
//!
//! Paths are JSON pointers (RFC 6901) into the stored record, e.g.
//! `/address/zip` or `/items/3/7`. A single store call applies its list of
//! operations atomically; separate calls carry no ordering guarantee.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatchError {
  #[error("invalid patch path: {0:?}")]
  InvalidPath(String),

  #[error("patch path {0:?} has no parent in the target record")]
  MissingParent(String),

  #[error("patch path {path:?} is out of bounds (array length {len})")]
  OutOfBounds { path: String, len: usize },

  #[error("patch path {0:?} does not address an object or array")]
  NotAContainer(String),
}

/// A single partial-update operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
  /// Replace (or add, for object members) the value at `path`.
  Set { path: String, value: Value },
}

impl PatchOperation {
  pub fn set(path: impl Into<String>, value: Value) -> Self {
    Self::Set {
      path: path.into(),
      value,
    }
  }

  pub fn path(&self) -> &str {
    match self {
      Self::Set { path, .. } => path,
    }
  }

  /// Apply this operation to `target` in place.
  pub fn apply(&self, target: &mut Value) -> Result<(), PatchError> {
    match self {
      Self::Set { path, value } => set_pointer(target, path, value.clone()),
    }
  }
}

/// Apply `ops` in order, stopping at the first failure.
///
/// Callers wanting all-or-nothing behaviour should apply to a copy.
pub fn apply_all(ops: &[PatchOperation], target: &mut Value) -> Result<(), PatchError> {
  ops.iter().try_for_each(|op| op.apply(target))
}

fn set_pointer(target: &mut Value, path: &str, value: Value) -> Result<(), PatchError> {
  if !path.starts_with('/') {
    return Err(PatchError::InvalidPath(path.to_owned()));
  }
  let (parent, last) = path
    .rsplit_once('/')
    .ok_or_else(|| PatchError::InvalidPath(path.to_owned()))?;
  let key = last.replace("~1", "/").replace("~0", "~");

  let container = target
    .pointer_mut(parent)
    .ok_or_else(|| PatchError::MissingParent(path.to_owned()))?;

  match container {
    Value::Object(map) => {
      map.insert(key, value);
      Ok(())
    }
    Value::Array(items) => {
      let index: usize = key
        .parse()
        .map_err(|_| PatchError::InvalidPath(path.to_owned()))?;
      let len = items.len();
      let slot = items.get_mut(index).ok_or_else(|| PatchError::OutOfBounds {
        path: path.to_owned(),
        len,
      })?;
      *slot = value;
      Ok(())
    }
    _ => Err(PatchError::NotAContainer(path.to_owned())),
  }
}
