use crate::wizard::WizardPhase;
use casenote_ids::RecordId;

/// Failures reported by a [`RecordStore`](crate::store::RecordStore) implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(RecordId),
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize stored draft: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("stored data is corrupt: {0}")]
    Corrupt(String),
    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("no record is loaded")]
    NotLoaded,
    #[error("failed to load record: {0}")]
    Load(#[source] StoreError),
    #[error("failed to save record: {0}")]
    Save(#[source] StoreError),
    #[error("failed to delete dependent artifacts: {0}")]
    DeleteDependents(#[source] StoreError),
    #[error("failed to delete record: {0}")]
    DeleteRecord(#[source] StoreError),
    #[error("deletion must be requested before it can be confirmed")]
    DeleteNotRequested,
    #[error("cannot {action} while the wizard is {phase}")]
    InvalidTransition {
        phase: WizardPhase,
        action: &'static str,
    },
    #[error("unknown section: {0}")]
    UnknownSection(String),
    #[error("unknown field: {0}")]
    UnknownField(String),
    #[error("section registry is invalid: {0}")]
    InvalidRegistry(String),
}

pub type WizardResult<T> = std::result::Result<T, WizardError>;
