use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// One persisted transcription/translation result.
///
/// Immutable once created; removed only by explicit delete or clear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Original upload filename
    pub filename: String,

    /// Target language display name
    pub language: String,

    /// Full transcript text
    pub transcription: String,

    /// Translated text
    pub translation: String,
}

/// Ordered history of past results, mirrored to a JSON file on every
/// mutation and read once at startup.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    records: Vec<HistoryRecord>,
}

impl HistoryStore {
    /// Load the history file, treating a missing or unparseable file as an
    /// empty history.
    pub async fn load(path: PathBuf) -> Self {
        let records = match fs::read_to_string(&path).await {
            Ok(content) => match serde_json::from_str::<Vec<HistoryRecord>>(&content) {
                Ok(records) => records,
                Err(e) => {
                    warn!("History file {} is unreadable, starting empty: {}", path.display(), e);
                    Vec::new()
                }
            },
            Err(_) => {
                debug!("No history file at {}, starting empty", path.display());
                Vec::new()
            }
        };

        info!("Loaded {} history records from {}", records.len(), path.display());
        Self { path, records }
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&HistoryRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append a record and rewrite the backing file.
    pub async fn append(&mut self, record: HistoryRecord) -> Result<()> {
        self.records.push(record);
        self.persist().await?;
        debug!("Appended history record ({} total)", self.records.len());
        Ok(())
    }

    /// Delete the record at `index` and rewrite the backing file.
    ///
    /// Out-of-bounds indices are a no-op; returns whether a record was
    /// removed.
    pub async fn delete(&mut self, index: usize) -> Result<bool> {
        if index >= self.records.len() {
            debug!("Delete index {} out of bounds ({} records)", index, self.records.len());
            return Ok(false);
        }

        self.records.remove(index);
        self.persist().await?;
        Ok(true)
    }

    /// Drop all records and remove the backing file.
    pub async fn clear(&mut self) -> Result<()> {
        self.records.clear();
        if path_exists(&self.path).await {
            fs::remove_file(&self.path).await?;
        }
        info!("History cleared");
        Ok(())
    }

    /// Rewrite the full record sequence to disk.
    ///
    /// Writes a sibling temp file and renames it over the target so a
    /// crash mid-write cannot leave a truncated history.
    async fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(&self.records)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json).await?;
        fs::rename(&tmp_path, &self.path).await?;

        Ok(())
    }
}

async fn path_exists(path: &Path) -> bool {
    fs::metadata(path).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(n: usize) -> HistoryRecord {
        HistoryRecord {
            filename: format!("clip_{}.wav", n),
            language: "French".to_string(),
            transcription: format!("transcript {}", n),
            translation: format!("traduction {}", n),
        }
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::load(dir.path().join("history.json")).await;
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_load_corrupt_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = HistoryStore::load(path).await;
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_append_then_reload_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");

        let mut store = HistoryStore::load(path.clone()).await;
        store.append(record(0)).await.unwrap();
        store.append(record(1)).await.unwrap();
        store.append(record(2)).await.unwrap();

        let reloaded = HistoryStore::load(path).await;
        assert_eq!(reloaded.records(), store.records());
        assert_eq!(reloaded.get(1).unwrap().filename, "clip_1.wav");
    }

    #[tokio::test]
    async fn test_delete_in_bounds() {
        let dir = TempDir::new().unwrap();
        let mut store = HistoryStore::load(dir.path().join("history.json")).await;
        store.append(record(0)).await.unwrap();
        store.append(record(1)).await.unwrap();
        store.append(record(2)).await.unwrap();

        assert!(store.delete(1).await.unwrap());
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(0).unwrap().filename, "clip_0.wav");
        assert_eq!(store.get(1).unwrap().filename, "clip_2.wav");
    }

    #[tokio::test]
    async fn test_delete_out_of_bounds_is_noop() {
        let dir = TempDir::new().unwrap();
        let mut store = HistoryStore::load(dir.path().join("history.json")).await;
        store.append(record(0)).await.unwrap();

        assert!(!store.delete(5).await.unwrap());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_clear_removes_backing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");

        let mut store = HistoryStore::load(path.clone()).await;
        store.append(record(0)).await.unwrap();
        assert!(path.exists());

        store.clear().await.unwrap();
        assert!(store.is_empty());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_clear_on_empty_store() {
        let dir = TempDir::new().unwrap();
        let mut store = HistoryStore::load(dir.path().join("history.json")).await;
        store.clear().await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_no_temp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");

        let mut store = HistoryStore::load(path.clone()).await;
        store.append(record(0)).await.unwrap();

        assert!(!path.with_extension("json.tmp").exists());
    }
}
