//! Bounded history of strip analyses.
//!
//! The whole history is one JSON array stored under a single key of a
//! [`StorageBackend`](crate::db::StorageBackend). Reads sort by timestamp,
//! newest first; writes keep insertion order and drop the tail past the cap.

pub mod comparison;
pub mod samples;
pub mod store;

pub use comparison::*;
pub use samples::*;
pub use store::*;

use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Storage error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid test result: {0}")]
    Validation(String),

    #[error("Test ID is required")]
    InvalidId,

    #[error("Invalid import: {0}")]
    InvalidImport(String),
}
