//! Persistence collaborator consumed by the wizard.
//!
//! The engine does not choose a storage medium. Hosts hand the wizard an implementation of
//! [`RecordStore`]; timeouts and retries of the underlying calls belong to that
//! implementation. The engine treats each failed call as final for that attempt.

use crate::error::StoreResult;
use crate::field_mapper::ExternalRecord;
use casenote_ids::RecordId;
use serde::{Deserialize, Serialize};

/// What the store persists for one record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDraft {
    /// Record in the store's own column naming.
    pub record: ExternalRecord,
    /// Serialized workflow progress. Opaque to the store.
    #[serde(default)]
    pub workflow_progress: Option<String>,
}

#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetches the record and its progress blob.
    async fn load(&self, id: RecordId) -> StoreResult<StoredDraft>;

    /// Replaces the stored record and progress blob. Last write wins.
    async fn save(&self, id: RecordId, draft: &StoredDraft) -> StoreResult<()>;

    /// Removes the record itself. Only called after [`RecordStore::delete_dependents`]
    /// succeeded.
    async fn delete_record(&self, id: RecordId) -> StoreResult<()>;

    /// Removes artifacts that hang off the record (investigations, attachments).
    async fn delete_dependents(&self, id: RecordId) -> StoreResult<()>;
}
