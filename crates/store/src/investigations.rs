//! Lab and imaging investigations attached to a record.
//!
//! Investigations have their own lifecycle: the documentation engine never reads or writes
//! them, it only hosts the section that displays them. They are removed as dependents
//! before their record is deleted.

use crate::blocking;
use crate::constants::INVESTIGATIONS_FILENAME;
use casenote_core::{StoreError, StoreResult};
use casenote_ids::{EntryId, RecordId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestigationKind {
    Lab,
    Imaging,
}

impl std::str::FromStr for InvestigationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lab" | "laboratory" => Ok(InvestigationKind::Lab),
            "imaging" | "radiology" => Ok(InvestigationKind::Imaging),
            other => Err(format!("unknown investigation kind: {}", other)),
        }
    }
}

/// One ordered investigation and, once available, its result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Investigation {
    pub id: EntryId,
    pub kind: InvestigationKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    pub requested_at: DateTime<Utc>,
}

/// Investigations for records stored under one data directory.
///
/// Entries for a record live in `investigations.yaml` inside the record's directory, in
/// creation order.
#[derive(Clone, Debug)]
pub struct InvestigationsService {
    data_dir: PathBuf,
}

impl InvestigationsService {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
        }
    }

    fn file_path(&self, record_id: RecordId) -> PathBuf {
        record_id
            .sharded_dir(&self.data_dir)
            .join(INVESTIGATIONS_FILENAME)
    }

    /// Lists the investigations for `record_id`, oldest first. A record with none yields an
    /// empty list.
    pub async fn list(&self, record_id: RecordId) -> StoreResult<Vec<Investigation>> {
        let path = self.file_path(record_id);
        blocking(move || read_entries(&path)).await
    }

    /// Appends an investigation to `record_id`'s list.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if `name` is blank, and [`StoreError::Corrupt`] if
    /// the existing list cannot be parsed.
    pub async fn add(
        &self,
        record_id: RecordId,
        kind: InvestigationKind,
        name: &str,
        result: Option<String>,
    ) -> StoreResult<Investigation> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::Backend("investigation name is required".into()));
        }

        let path = self.file_path(record_id);
        let name = name.to_string();
        let result = result
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        let entry = blocking(move || {
            let mut entries = read_entries(&path)?;
            let entry = Investigation {
                id: EntryId::generate(entries.last().map(|e| &e.id)),
                kind,
                name,
                result,
                requested_at: Utc::now(),
            };
            entries.push(entry.clone());
            write_entries(&path, &entries)?;
            Ok(entry)
        })
        .await?;

        tracing::info!("added investigation {} to record {}", entry.id, record_id);
        Ok(entry)
    }
}

fn read_entries(path: &Path) -> StoreResult<Vec<Investigation>> {
    let yaml = match fs::read_to_string(path) {
        Ok(yaml) => yaml,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StoreError::Io(e)),
    };
    if yaml.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_yaml::from_str(&yaml)
        .map_err(|e| StoreError::Corrupt(format!("{}: {}", path.display(), e)))
}

fn write_entries(path: &Path, entries: &[Investigation]) -> StoreResult<()> {
    let yaml = serde_yaml::to_string(entries)
        .map_err(|e| StoreError::Backend(format!("failed to serialize investigations: {}", e)))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, yaml)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FileRecordStore;
    use casenote_core::RecordStore;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_list_without_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let service = InvestigationsService::new(temp.path());

        assert!(service.list(RecordId::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_appends_in_creation_order() {
        let temp = TempDir::new().unwrap();
        let service = InvestigationsService::new(temp.path());
        let id = RecordId::new();

        let first = service
            .add(id, InvestigationKind::Lab, "Full blood count", None)
            .await
            .unwrap();
        let second = service
            .add(
                id,
                InvestigationKind::Imaging,
                "Chest X-ray",
                Some("No consolidation".into()),
            )
            .await
            .unwrap();

        let listed = service.list(id).await.unwrap();
        assert_eq!(listed, vec![first.clone(), second.clone()]);
        assert!(first.id.timestamp() < second.id.timestamp());
        assert!(first.id.to_string() < second.id.to_string());
    }

    #[tokio::test]
    async fn test_add_rejects_blank_name_and_drops_blank_result() {
        let temp = TempDir::new().unwrap();
        let service = InvestigationsService::new(temp.path());
        let id = RecordId::new();

        assert!(service
            .add(id, InvestigationKind::Lab, "   ", None)
            .await
            .is_err());

        let entry = service
            .add(id, InvestigationKind::Lab, " HbA1c ", Some("  ".into()))
            .await
            .unwrap();
        assert_eq!(entry.name, "HbA1c");
        assert_eq!(entry.result, None);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let temp = TempDir::new().unwrap();
        let service = InvestigationsService::new(temp.path());
        let id = RecordId::new();
        let path = service.file_path(id);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "- id: [unterminated").unwrap();

        assert!(matches!(
            service.list(id).await.unwrap_err(),
            StoreError::Corrupt(_)
        ));
    }

    #[tokio::test]
    async fn test_record_store_removes_investigations_as_dependents() {
        let temp = TempDir::new().unwrap();
        let service = InvestigationsService::new(temp.path());
        let store = FileRecordStore::new(temp.path()).unwrap();
        let id = RecordId::new();
        service
            .add(id, InvestigationKind::Lab, "Urea and electrolytes", None)
            .await
            .unwrap();

        store.delete_dependents(id).await.unwrap();

        assert!(service.list(id).await.unwrap().is_empty());
    }

    #[test]
    fn test_kind_parses_common_spellings() {
        assert_eq!("Lab".parse::<InvestigationKind>(), Ok(InvestigationKind::Lab));
        assert_eq!("radiology".parse::<InvestigationKind>(), Ok(InvestigationKind::Imaging));
        assert!("blood".parse::<InvestigationKind>().is_err());
    }
}
