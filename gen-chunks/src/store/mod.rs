//! The knowledge file: a JSON array of chunk records accumulated across runs.

mod persistence;
mod types;

use thiserror::Error;

pub use persistence::{MergeReport, load_collection, merge, save_collection};
pub use types::{ChunkRecord, Collection};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("knowledge file is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("knowledge file does not contain a JSON array")]
    NotAnArray,

    #[error("failed to serialize knowledge file: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to replace knowledge file: {0}")]
    Persist(#[source] std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Whether the file exists but its contents cannot be used as a collection.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, StoreError::Malformed(_) | StoreError::NotAnArray)
    }
}
