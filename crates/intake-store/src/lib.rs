//! Intake Storage Layer
//!
//! Implements the `RecordStore` trait from `intake-domain`.
//!
//! # Stores
//!
//! - `MemoryStore`: an owned, in-process record collection with explicit
//!   `append` / `replace_by_id` / `remove_by_id` / `snapshot` operations and
//!   change subscriptions
//! - `JsonFileStore`: the same collection mirrored to a JSON file after every
//!   mutation, so records survive process restarts
//!
//! # Examples
//!
//! ```
//! use intake_store::MemoryStore;
//! use intake_domain::FeatureRequestRecord;
//!
//! let store = MemoryStore::new();
//! let stored = store.append(FeatureRequestRecord {
//!     want: "dark mode".to_string(),
//!     ..Default::default()
//! }).unwrap();
//! assert_eq!(store.snapshot().unwrap(), vec![stored]);
//! ```

#![warn(missing_docs)]

pub mod file;
pub mod memory;

use intake_domain::RecordId;
use thiserror::Error;

pub use file::JsonFileStore;
pub use memory::{MemoryStore, StoreEvent, SubscriptionId};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(RecordId),

    /// Reading or writing the backing file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backing file is not a valid record list
    #[error("Invalid data: {0}")]
    InvalidData(#[from] serde_json::Error),

    /// The collection lock was poisoned by a panicking writer
    #[error("Store lock poisoned")]
    Poisoned,
}
