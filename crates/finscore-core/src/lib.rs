//! Core types, trait definitions, and scoring logic for the finscore service.
//!
//! This crate has no HTTP or database dependencies. Storage
//! backends implement [`store::DocumentStore`]; outbound peer calls go through
//! [`peer::Peer`]. The score aggregation engine and the refresh fan-out are
//! written against those two traits only.

pub mod document;
pub mod error;
pub mod patch;
pub mod peer;
pub mod refresh;
pub mod repository;
pub mod score;
pub mod sheet;
pub mod store;
pub mod subject;
pub mod time;

pub use error::{Error, Result};
