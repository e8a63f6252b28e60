//! SQLite backend for the finscore document store.
//!
//! Records are stored as JSON bodies, one table per container, with the
//! subject id as partition key. Wraps [`tokio_rusqlite`] so all database
//! access runs on a dedicated thread without blocking the async runtime.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
