use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rackview_reconcile::AggregateSnapshot;

use super::{AggregateStore, InMemoryAggregateStore, StoreError};

/// Snapshot store that persists the last snapshot as a JSON file.
///
/// Writes go to a sibling temp file which is then renamed over the target, so
/// a crash mid-write leaves the previous file intact. Reads are served from
/// memory.
#[derive(Debug)]
pub struct JsonFileAggregateStore {
    path: PathBuf,
    memory: InMemoryAggregateStore,
}

impl JsonFileAggregateStore {
    /// Open the store, loading the persisted snapshot when the file exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let memory = match fs::read(&path) {
            Ok(bytes) => {
                let snapshot: AggregateSnapshot = serde_json::from_slice(&bytes)?;
                tracing::info!(
                    path = %path.display(),
                    computed_at = %snapshot.computed_at,
                    cells = snapshot.cells.len(),
                    "loaded persisted aggregate snapshot"
                );
                InMemoryAggregateStore::with_snapshot(snapshot)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => InMemoryAggregateStore::new(),
            Err(source) => return Err(io_error(&path, source)),
        };
        Ok(Self { path, memory })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn persist(&self, snapshot: &AggregateSnapshot) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(snapshot)?;
        let tmp = self.temp_path();

        let mut file = fs::File::create(&tmp).map_err(|e| io_error(&tmp, e))?;
        file.write_all(&bytes).map_err(|e| io_error(&tmp, e))?;
        file.sync_all().map_err(|e| io_error(&tmp, e))?;
        drop(file);

        fs::rename(&tmp, &self.path).map_err(|e| io_error(&self.path, e))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

impl AggregateStore for JsonFileAggregateStore {
    fn write_snapshot(&self, snapshot: AggregateSnapshot) -> Result<(), StoreError> {
        // Disk first: a failed persist must not leave memory ahead of the file.
        self.persist(&snapshot)?;
        self.memory.write_snapshot(snapshot)
    }

    fn snapshot(&self) -> Option<Arc<AggregateSnapshot>> {
        self.memory.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn scratch_path() -> PathBuf {
        std::env::temp_dir().join(format!("rackview-store-{}.json", uuid::Uuid::now_v7()))
    }

    #[test]
    fn missing_file_opens_empty() {
        let path = scratch_path();
        let store = JsonFileAggregateStore::open(&path).unwrap();
        assert!(store.snapshot().is_none());
        assert!(!path.exists());
    }

    #[test]
    fn snapshot_survives_reopen() {
        let path = scratch_path();
        let at = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();

        let store = JsonFileAggregateStore::open(&path).unwrap();
        store.write_snapshot(AggregateSnapshot::empty(at)).unwrap();
        assert!(!store.temp_path().exists());

        let reopened = JsonFileAggregateStore::open(&path).unwrap();
        assert_eq!(reopened.last_computed(), Some(at));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let path = scratch_path();
        fs::write(&path, b"{ not json").unwrap();

        let err = JsonFileAggregateStore::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Serialize(_)));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn failed_persist_keeps_previous_snapshot() {
        let dir = std::env::temp_dir().join(format!("rackview-missing-{}", uuid::Uuid::now_v7()));
        let store = JsonFileAggregateStore {
            path: dir.join("snapshot.json"),
            memory: InMemoryAggregateStore::with_snapshot(AggregateSnapshot::empty(
                DateTime::<Utc>::from_timestamp(1, 0).unwrap(),
            )),
        };

        let err = store
            .write_snapshot(AggregateSnapshot::empty(Utc::now()))
            .unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        assert_eq!(
            store.last_computed(),
            DateTime::<Utc>::from_timestamp(1, 0)
        );
    }
}
