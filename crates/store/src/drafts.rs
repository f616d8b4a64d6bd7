//! Draft persistence on the local filesystem.

use crate::blocking;
use crate::constants::{DRAFT_FILENAME, INVESTIGATIONS_FILENAME, TEMP_SUFFIX};
use casenote_core::{RecordStore, StoreError, StoreResult, StoredDraft};
use casenote_ids::RecordId;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

/// [`RecordStore`] keeping each record's draft as pretty-printed JSON.
///
/// Saves replace the whole draft: the new content is written to a scratch file in the record
/// directory and renamed over `draft.json`, so a crash mid-save leaves the previous draft in
/// place.
#[derive(Clone, Debug)]
pub struct FileRecordStore {
    data_dir: PathBuf,
}

impl FileRecordStore {
    /// Creates a store rooted at `data_dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created, or
    /// [`StoreError::Backend`] if `data_dir` exists but is not a directory.
    pub fn new(data_dir: &Path) -> StoreResult<Self> {
        if data_dir.exists() && !data_dir.is_dir() {
            return Err(StoreError::Backend(format!(
                "path is not a directory: {}",
                data_dir.display()
            )));
        }
        fs::create_dir_all(data_dir)?;

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Directory holding everything stored for `id`.
    pub fn record_dir(&self, id: RecordId) -> PathBuf {
        id.sharded_dir(&self.data_dir)
    }

    pub fn draft_path(&self, id: RecordId) -> PathBuf {
        self.record_dir(id).join(DRAFT_FILENAME)
    }

    /// Whether a draft has been saved for `id`.
    pub fn exists(&self, id: RecordId) -> bool {
        self.draft_path(id).is_file()
    }
}

#[async_trait::async_trait]
impl RecordStore for FileRecordStore {
    async fn load(&self, id: RecordId) -> StoreResult<StoredDraft> {
        let path = self.draft_path(id);
        blocking(move || read_draft(id, &path)).await
    }

    async fn save(&self, id: RecordId, draft: &StoredDraft) -> StoreResult<()> {
        let dir = self.record_dir(id);
        let json = serde_json::to_string_pretty(draft)?;
        blocking(move || write_draft(&dir, &json)).await?;
        tracing::debug!("wrote draft for record {}", id);
        Ok(())
    }

    async fn delete_record(&self, id: RecordId) -> StoreResult<()> {
        let dir = self.record_dir(id);
        blocking(move || remove_record_dir(&dir)).await?;
        tracing::info!("removed record directory for {}", id);
        Ok(())
    }

    async fn delete_dependents(&self, id: RecordId) -> StoreResult<()> {
        let path = self.record_dir(id).join(INVESTIGATIONS_FILENAME);
        blocking(move || remove_if_present(&path)).await
    }
}

fn read_draft(id: RecordId, path: &Path) -> StoreResult<StoredDraft> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(StoreError::NotFound(id)),
        Err(e) => return Err(StoreError::Io(e)),
    };

    serde_json::from_str(&json)
        .map_err(|e| StoreError::Corrupt(format!("{}: {}", path.display(), e)))
}

fn write_draft(dir: &Path, json: &str) -> StoreResult<()> {
    fs::create_dir_all(dir)?;

    let target = dir.join(DRAFT_FILENAME);
    let scratch = target.with_extension(TEMP_SUFFIX);
    fs::write(&scratch, json)?;
    fs::rename(&scratch, &target)?;
    Ok(())
}

fn remove_record_dir(dir: &Path) -> StoreResult<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StoreError::Io(e)),
    }
}

fn remove_if_present(path: &Path) -> StoreResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StoreError::Io(io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn draft(record: serde_json::Value, progress: Option<&str>) -> StoredDraft {
        let serde_json::Value::Object(record) = record else {
            panic!("record must be an object");
        };
        StoredDraft {
            record,
            workflow_progress: progress.map(str::to_string),
        }
    }

    #[test]
    fn test_new_creates_data_dir() {
        let temp = TempDir::new().unwrap();
        let data_dir = temp.path().join("record_data");

        let store = FileRecordStore::new(&data_dir).unwrap();

        assert!(data_dir.is_dir());
        assert_eq!(store.data_dir(), data_dir.as_path());
    }

    #[test]
    fn test_new_rejects_file_path() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("not_a_dir");
        fs::write(&file, b"x").unwrap();

        let err = FileRecordStore::new(&file).unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
    }

    #[test]
    fn test_draft_path_is_sharded() {
        let temp = TempDir::new().unwrap();
        let store = FileRecordStore::new(temp.path()).unwrap();
        let id = RecordId::parse("550e8400e29b41d4a716446655440000").unwrap();

        assert_eq!(
            store.draft_path(id),
            temp.path()
                .join("55")
                .join("0e")
                .join("550e8400e29b41d4a716446655440000")
                .join(DRAFT_FILENAME)
        );
    }

    #[tokio::test]
    async fn test_save_then_load_returns_saved_draft() {
        let temp = TempDir::new().unwrap();
        let store = FileRecordStore::new(temp.path()).unwrap();
        let id = RecordId::new();
        let saved = draft(
            json!({ "chief_complaint": "Fever", "heart_rate": 90, "is_complete": false }),
            Some(r#"{"sections":{}}"#),
        );

        store.save(id, &saved).await.unwrap();
        let loaded = store.load(id).await.unwrap();

        assert_eq!(loaded, saved);
        assert!(store.exists(id));
        assert!(!store.draft_path(id).with_extension(TEMP_SUFFIX).exists());
    }

    #[tokio::test]
    async fn test_save_replaces_previous_draft() {
        let temp = TempDir::new().unwrap();
        let store = FileRecordStore::new(temp.path()).unwrap();
        let id = RecordId::new();

        store
            .save(id, &draft(json!({ "allergies": "None" }), None))
            .await
            .unwrap();
        store
            .save(id, &draft(json!({ "allergies": "Penicillin" }), None))
            .await
            .unwrap();

        let loaded = store.load(id).await.unwrap();
        assert_eq!(loaded.record["allergies"], json!("Penicillin"));
    }

    #[tokio::test]
    async fn test_load_missing_record_is_not_found() {
        let temp = TempDir::new().unwrap();
        let store = FileRecordStore::new(temp.path()).unwrap();
        let id = RecordId::new();

        let err = store.load(id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(missing) if missing == id));
    }

    #[tokio::test]
    async fn test_load_unparseable_draft_is_corrupt() {
        let temp = TempDir::new().unwrap();
        let store = FileRecordStore::new(temp.path()).unwrap();
        let id = RecordId::new();
        fs::create_dir_all(store.record_dir(id)).unwrap();
        fs::write(store.draft_path(id), "{ not json").unwrap();

        let err = store.load(id).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }

    #[tokio::test]
    async fn test_draft_without_progress_loads() {
        let temp = TempDir::new().unwrap();
        let store = FileRecordStore::new(temp.path()).unwrap();
        let id = RecordId::new();
        fs::create_dir_all(store.record_dir(id)).unwrap();
        fs::write(store.draft_path(id), r#"{"record":{"diagnosis":"Asthma"}}"#).unwrap();

        let loaded = store.load(id).await.unwrap();
        assert_eq!(loaded.workflow_progress, None);
        assert_eq!(loaded.record["diagnosis"], json!("Asthma"));
    }

    #[tokio::test]
    async fn test_delete_dependents_then_record() {
        let temp = TempDir::new().unwrap();
        let store = FileRecordStore::new(temp.path()).unwrap();
        let id = RecordId::new();
        store.save(id, &StoredDraft::default()).await.unwrap();
        let investigations = store.record_dir(id).join(INVESTIGATIONS_FILENAME);
        fs::write(&investigations, "[]").unwrap();

        store.delete_dependents(id).await.unwrap();
        assert!(!investigations.exists());
        assert!(store.exists(id));

        store.delete_record(id).await.unwrap();
        assert!(!store.record_dir(id).exists());
        assert!(matches!(
            store.load(id).await.unwrap_err(),
            StoreError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_deletes_are_idempotent() {
        let temp = TempDir::new().unwrap();
        let store = FileRecordStore::new(temp.path()).unwrap();
        let id = RecordId::new();

        store.delete_dependents(id).await.unwrap();
        store.delete_record(id).await.unwrap();
    }
}
