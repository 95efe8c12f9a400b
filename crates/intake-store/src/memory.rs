//! In-memory record collection with explicit change notification

use crate::StoreError;
use async_trait::async_trait;
use intake_domain::record::current_timestamp;
use intake_domain::traits::RecordStore;
use intake_domain::{FeatureRequestRecord, RecordId, RecordPatch, StoredRecord};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// A change applied to the collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A record was added
    Appended(StoredRecord),
    /// A record was replaced by its updated form
    Replaced(StoredRecord),
    /// A record was removed
    Removed(RecordId),
}

/// Handle returned by [`MemoryStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&StoreEvent) + Send + Sync>;

#[derive(Default)]
struct Inner {
    records: Vec<StoredRecord>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

/// Owned, shareable record collection
///
/// Clones share the same collection. Each mutation is applied under a single
/// lock; listeners run afterwards on the calling thread, outside the lock, so a
/// listener may read the store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `records`, oldest first
    pub fn from_records(records: Vec<StoredRecord>) -> Self {
        let store = Self::new();
        if let Ok(mut inner) = store.inner.lock() {
            inner.records = records;
        }
        store
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner.lock().map_err(|_| StoreError::Poisoned)
    }

    fn notify(&self, event: StoreEvent) {
        let listeners: Vec<Listener> = match self.inner.lock() {
            Ok(inner) => inner.listeners.iter().map(|(_, l)| Arc::clone(l)).collect(),
            Err(_) => return,
        };
        for listener in listeners {
            listener(&event);
        }
    }

    /// Add a record with a fresh identity
    pub fn append(&self, record: FeatureRequestRecord) -> Result<StoredRecord, StoreError> {
        let stored = StoredRecord::new(record);
        self.lock()?.records.push(stored.clone());
        debug!("Appended record {}", stored.id);
        self.notify(StoreEvent::Appended(stored.clone()));
        Ok(stored)
    }

    /// Apply `patch` to the record with `id`, bumping its update time
    pub fn replace_by_id(&self, id: RecordId, patch: &RecordPatch) -> Result<StoredRecord, StoreError> {
        let updated = {
            let mut inner = self.lock()?;
            let slot = inner
                .records
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or(StoreError::NotFound(id))?;
            patch.apply(&mut slot.record);
            slot.updated_at = current_timestamp();
            slot.clone()
        };
        debug!("Replaced record {}", id);
        self.notify(StoreEvent::Replaced(updated.clone()));
        Ok(updated)
    }

    /// Remove the record with `id`, returning it
    pub fn remove_by_id(&self, id: RecordId) -> Result<StoredRecord, StoreError> {
        let removed = {
            let mut inner = self.lock()?;
            let index = inner
                .records
                .iter()
                .position(|r| r.id == id)
                .ok_or(StoreError::NotFound(id))?;
            inner.records.remove(index)
        };
        debug!("Removed record {}", id);
        self.notify(StoreEvent::Removed(id));
        Ok(removed)
    }

    /// Put `original` back in place of the record with the same id
    pub fn restore(&self, original: StoredRecord) -> Result<(), StoreError> {
        {
            let mut inner = self.lock()?;
            let slot = inner
                .records
                .iter_mut()
                .find(|r| r.id == original.id)
                .ok_or(StoreError::NotFound(original.id))?;
            *slot = original.clone();
        }
        debug!("Restored record {}", original.id);
        self.notify(StoreEvent::Replaced(original));
        Ok(())
    }

    /// Re-insert a previously removed record at `index` (clamped to the end)
    pub fn insert_at(&self, index: usize, record: StoredRecord) -> Result<(), StoreError> {
        {
            let mut inner = self.lock()?;
            let index = index.min(inner.records.len());
            inner.records.insert(index, record.clone());
        }
        debug!("Reinserted record {} at {}", record.id, index);
        self.notify(StoreEvent::Appended(record));
        Ok(())
    }

    /// Index of the record with `id`
    pub fn position(&self, id: RecordId) -> Result<Option<usize>, StoreError> {
        Ok(self.lock()?.records.iter().position(|r| r.id == id))
    }

    /// Copy of the whole collection, oldest first
    pub fn snapshot(&self) -> Result<Vec<StoredRecord>, StoreError> {
        Ok(self.lock()?.records.clone())
    }

    /// Look up one record
    pub fn find(&self, id: RecordId) -> Result<Option<StoredRecord>, StoreError> {
        Ok(self.lock()?.records.iter().find(|r| r.id == id).cloned())
    }

    /// Number of records held
    pub fn len(&self) -> usize {
        self.lock().map(|inner| inner.records.len()).unwrap_or(0)
    }

    /// True when the store holds no records
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register a listener for every subsequent change
    pub fn subscribe<F>(&self, listener: F) -> Result<SubscriptionId, StoreError>
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        let mut inner = self.lock()?;
        let id = SubscriptionId(inner.next_subscription);
        inner.next_subscription += 1;
        inner.listeners.push((id, Arc::new(listener)));
        Ok(id)
    }

    /// Remove a listener; returns false if it was not registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> Result<bool, StoreError> {
        let mut inner = self.lock()?;
        let before = inner.listeners.len();
        inner.listeners.retain(|(sid, _)| *sid != id);
        Ok(inner.listeners.len() != before)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    type Error = StoreError;

    async fn create(&self, record: FeatureRequestRecord) -> Result<StoredRecord, Self::Error> {
        self.append(record)
    }

    async fn list(&self) -> Result<Vec<StoredRecord>, Self::Error> {
        self.snapshot()
    }

    async fn get(&self, id: RecordId) -> Result<Option<StoredRecord>, Self::Error> {
        self.find(id)
    }

    async fn update(&self, id: RecordId, patch: RecordPatch) -> Result<StoredRecord, Self::Error> {
        self.replace_by_id(id, &patch)
    }

    async fn delete(&self, id: RecordId) -> Result<(), Self::Error> {
        self.remove_by_id(id).map(|_| ())
    }
}
