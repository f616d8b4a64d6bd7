//! Casenote file storage
//!
//! File-backed implementations of the collaborators the documentation engine relies on:
//!
//! - [`FileRecordStore`]: the [`RecordStore`](casenote_core::RecordStore) holding one draft
//!   per record
//! - [`InvestigationsService`]: the lab and imaging list that hangs off a record
//!
//! ## Storage layout
//!
//! Records are sharded by the first four hex characters of their id:
//!
//! ```text
//! <data_dir>/
//! └── 55/
//!     └── 0e/
//!         └── 550e8400e29b41d4a716446655440000/
//!             ├── draft.json            # record columns + workflow progress blob
//!             └── investigations.yaml   # dependent entries, removed before the draft
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use casenote_store::FileRecordStore;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = FileRecordStore::new(Path::new("record_data"))?;
//! # Ok(())
//! # }
//! ```

mod constants;
mod drafts;
mod investigations;

pub use constants::{DRAFT_FILENAME, INVESTIGATIONS_FILENAME};
pub use drafts::FileRecordStore;
pub use investigations::{Investigation, InvestigationKind, InvestigationsService};

use casenote_core::{StoreError, StoreResult};

/// Runs blocking file I/O off the async executor.
pub(crate) async fn blocking<T, F>(f: F) -> StoreResult<T>
where
    F: FnOnce() -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StoreError::Backend(format!("storage task failed: {}", e)))?
}
