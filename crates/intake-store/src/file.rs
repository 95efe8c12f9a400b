//! JSON-file backed record store

use crate::{MemoryStore, StoreError};
use async_trait::async_trait;
use intake_domain::traits::RecordStore;
use intake_domain::{FeatureRequestRecord, RecordId, RecordPatch, StoredRecord};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Record store that mirrors a [`MemoryStore`] to a JSON file
///
/// The file holds the full record list as a pretty-printed JSON array and is
/// rewritten after every mutation (write to a sibling temp file, then rename).
/// A mutation whose save fails is undone in memory before the error returns.
///
/// # Examples
///
/// ```no_run
/// use intake_store::JsonFileStore;
///
/// # async fn example() -> Result<(), intake_store::StoreError> {
/// let store = JsonFileStore::open("records.json").await?;
/// println!("{} records", store.memory().len());
/// # Ok(())
/// # }
/// ```
pub struct JsonFileStore {
    path: PathBuf,
    memory: MemoryStore,
}

impl JsonFileStore {
    /// Open the store at `path`, loading existing records if the file exists
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let records: Vec<StoredRecord> = match fs::read_to_string(&path).await {
            Ok(contents) if contents.trim().is_empty() => Vec::new(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        info!("Opened record store {} ({} records)", path.display(), records.len());

        Ok(Self {
            path,
            memory: MemoryStore::from_records(records),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The in-memory collection (for subscriptions and snapshots)
    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    async fn save(&self) -> Result<(), StoreError> {
        let records = self.memory.snapshot()?;
        let contents = serde_json::to_string_pretty(&records)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents).await?;
        fs::rename(&tmp, &self.path).await?;

        debug!("Saved {} records to {}", records.len(), self.path.display());
        Ok(())
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    type Error = StoreError;

    async fn create(&self, record: FeatureRequestRecord) -> Result<StoredRecord, Self::Error> {
        let stored = self.memory.append(record)?;
        if let Err(e) = self.save().await {
            self.memory.remove_by_id(stored.id)?;
            return Err(e);
        }
        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<StoredRecord>, Self::Error> {
        self.memory.snapshot()
    }

    async fn get(&self, id: RecordId) -> Result<Option<StoredRecord>, Self::Error> {
        self.memory.find(id)
    }

    async fn update(&self, id: RecordId, patch: RecordPatch) -> Result<StoredRecord, Self::Error> {
        let original = self.memory.find(id)?.ok_or(StoreError::NotFound(id))?;
        let updated = self.memory.replace_by_id(id, &patch)?;
        if let Err(e) = self.save().await {
            self.memory.restore(original)?;
            return Err(e);
        }
        Ok(updated)
    }

    async fn delete(&self, id: RecordId) -> Result<(), Self::Error> {
        let index = self.memory.position(id)?.ok_or(StoreError::NotFound(id))?;
        let removed = self.memory.remove_by_id(id)?;
        if let Err(e) = self.save().await {
            self.memory.insert_at(index, removed)?;
            return Err(e);
        }
        Ok(())
    }
}
