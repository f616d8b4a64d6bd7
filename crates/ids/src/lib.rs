//! Identifier and sharded-path utilities.
//!
//! Documentation drafts are keyed by a [`RecordId`]. The canonical textual form is
//! **32 lowercase hexadecimal characters** with no hyphens, which is also the form used
//! to derive the on-disk location of a draft.
//!
//! ## Sharded directory layout
//! For a canonical id `r`, stores place a draft under:
//! `parent_dir/<r[0..2]>/<r[2..4]>/<r>/`
//!
//! Example:
//! `record_data/55/0e/550e8400e29b41d4a716446655440000/`
//!
//! Entries attached to a draft (investigations) use an [`EntryId`], a timestamp-prefixed
//! identifier that sorts in creation order.

mod ids;

pub use ids::{EntryId, RecordId, Uuid};

/// Error type for identifier parsing.
#[derive(Debug, thiserror::Error)]
pub enum IdError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type IdResult<T> = Result<T, IdError>;
