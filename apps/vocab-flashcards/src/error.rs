//! Error types for the flashcard session.

use crate::models::GroupId;
use thiserror::Error;

/// Errors surfaced by loading and session operations.
#[derive(Debug, Error)]
pub enum VocabError {
    /// Startup fetch or parse failed. Recovered by the "no data" state.
    #[error("Failed to load vocabulary data: {0}")]
    DataLoadFailure(String),

    /// Uploaded content is not a valid vocabulary array.
    #[error("Invalid upload: {0}")]
    InvalidUploadFormat(String),

    /// Group identifier not present in the index.
    #[error("Group {0} does not exist")]
    InvalidGroupSelection(GroupId),

    /// Cursor target outside the active order.
    #[error("Card {index} is out of range ({len} cards)")]
    InvalidIndex { index: usize, len: usize },

    /// Operation requires a selected group.
    #[error("No group selected")]
    NoGroupSelected,
}

/// Result type for flashcard operations.
pub type VocabResult<T> = Result<T, VocabError>;
