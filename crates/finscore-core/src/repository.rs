//! Sheet-level operations layered on top of a [`DocumentStore`].

use futures::future::try_join_all;
use tracing::debug;

use crate::{
  Error, Result,
  sheet::{Sheet, SheetCell},
  store::DocumentStore,
};

/// Maximum number of patch operations sent in one store call.
pub const PATCH_BATCH_SIZE: usize = 10;

/// The sheet numbered `number` of a document, or [`Error::NotFound`].
pub async fn document_sheet<S: DocumentStore>(
  store: &S,
  subject_id: &str,
  document_id: &str,
  number: u32,
) -> Result<Sheet> {
  store
    .find_sheet(subject_id, document_id, number)
    .await
    .map_err(Error::store)?
    .ok_or(Error::NotFound)
}

/// Write `cells` into a sheet and return the re-read sheet.
///
/// Cells are grouped into batches of [`PATCH_BATCH_SIZE`] and the batches
/// are issued concurrently. Each batch is atomic on its own; if one fails,
/// batches that already landed stay applied. Duplicate coordinates in one
/// request resolve to whichever batch the store applies last.
pub async fn patch_sheet_cells<S: DocumentStore>(
  store: &S,
  subject_id: &str,
  document_id: &str,
  number: u32,
  cells: &[SheetCell],
) -> Result<Sheet> {
  let sheet = document_sheet(store, subject_id, document_id, number).await?;

  let batches = cells.chunks(PATCH_BATCH_SIZE).map(|batch| {
    let ops = batch.iter().map(SheetCell::to_operation).collect();
    store.patch_sheet(subject_id, &sheet.id, ops)
  });
  try_join_all(batches).await.map_err(Error::store)?;
  debug!(subject_id, sheet = %sheet.id, cells = cells.len(), "sheet cells patched");

  document_sheet(store, subject_id, document_id, number).await
}
