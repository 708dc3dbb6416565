//! Local persistence for directory keys and file records
//!
//! The codec only sees the [`MetadataStore`] trait. [`MemoryMetadataStore`]
//! backs tests and the CLI, and can be snapshotted to JSON.

use crate::record::{FileRecord, LocalEntity};
use cloudseal_crypto::MetadataKey;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by a store
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store refused a write
    #[error("write rejected: {0}")]
    WriteRejected(String),

    /// IO error while loading or saving a snapshot
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot could not be (de)serialized
    #[error("snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// Persistent state the codec reads and mutates
///
/// Calls are synchronous. Implementations need not coordinate concurrent
/// codec calls on the same directory; callers serialize those.
pub trait MetadataStore {
    /// Record `key` as the current metadata key of the directory
    fn set_directory_key(&self, server_url: &str, key: &MetadataKey) -> Result<(), StoreError>;

    /// The current metadata key of the directory, if one is known
    fn directory_key(&self, server_url: &str) -> Option<MetadataKey>;

    /// Remove every file record of the account in the directory.
    /// Returns how many were removed.
    fn delete_file_records(&self, account: &str, server_url: &str) -> Result<usize, StoreError>;

    /// Look up a known file by account and server-visible name
    fn find_local_entity(&self, account: &str, file_name: &str) -> Option<LocalEntity>;

    /// Persist one file record, replacing any with the same identifier
    fn save_file_record(&self, record: &FileRecord) -> Result<(), StoreError>;

    /// All file records of the account in the directory, ordered by identifier
    fn file_records(&self, account: &str, server_url: &str) -> Vec<FileRecord>;
}

type Scope = (String, String);

/// An in-memory store
#[derive(Clone, Default)]
pub struct MemoryMetadataStore {
    directory_keys: Arc<DashMap<String, MetadataKey>>,
    records: Arc<DashMap<Scope, BTreeMap<String, FileRecord>>>,
    entities: Arc<DashMap<Scope, LocalEntity>>,
}

/// Serialized form of a [`MemoryMetadataStore`]
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    #[serde(default)]
    pub directory_keys: BTreeMap<String, MetadataKey>,
    #[serde(default)]
    pub records: Vec<FileRecord>,
    #[serde(default)]
    pub entities: Vec<LocalEntity>,
}

impl MemoryMetadataStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a known local file
    pub fn insert_entity(&self, entity: LocalEntity) {
        let scope = (entity.account.clone(), entity.file_name.clone());
        self.entities.insert(scope, entity);
    }

    /// Number of file records across all directories
    pub fn record_count(&self) -> usize {
        self.records.iter().map(|entry| entry.value().len()).sum()
    }

    /// Build a store from a snapshot
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let store = Self::new();
        for (url, key) in snapshot.directory_keys {
            store.directory_keys.insert(url, key);
        }
        for record in snapshot.records {
            store.insert_record(record);
        }
        for entity in snapshot.entities {
            store.insert_entity(entity);
        }
        store
    }

    /// Capture the store contents
    pub fn snapshot(&self) -> StoreSnapshot {
        let directory_keys = self
            .directory_keys
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        let mut records: Vec<FileRecord> = self
            .records
            .iter()
            .flat_map(|entry| entry.value().values().cloned().collect::<Vec<_>>())
            .collect();
        records.sort_by(|a, b| {
            (&a.account, &a.server_url, &a.file_name_identifier)
                .cmp(&(&b.account, &b.server_url, &b.file_name_identifier))
        });

        let mut entities: Vec<LocalEntity> =
            self.entities.iter().map(|entry| entry.value().clone()).collect();
        entities.sort_by(|a, b| (&a.account, &a.file_name).cmp(&(&b.account, &b.file_name)));

        StoreSnapshot {
            directory_keys,
            records,
            entities,
        }
    }

    /// Load a snapshot file, or start empty if it does not exist
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_snapshot(serde_json::from_str(&text)?))
    }

    /// Write a snapshot file
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(&self.snapshot())?;
        std::fs::write(path, text)?;
        Ok(())
    }

    fn insert_record(&self, record: FileRecord) {
        let scope = (record.account.clone(), record.server_url.clone());
        self.records
            .entry(scope)
            .or_default()
            .insert(record.file_name_identifier.clone(), record);
    }
}

impl MetadataStore for MemoryMetadataStore {
    fn set_directory_key(&self, server_url: &str, key: &MetadataKey) -> Result<(), StoreError> {
        self.directory_keys.insert(server_url.to_string(), key.clone());
        Ok(())
    }

    fn directory_key(&self, server_url: &str) -> Option<MetadataKey> {
        self.directory_keys.get(server_url).map(|entry| entry.value().clone())
    }

    fn delete_file_records(&self, account: &str, server_url: &str) -> Result<usize, StoreError> {
        let removed = self
            .records
            .remove(&(account.to_string(), server_url.to_string()))
            .map(|(_, records)| records.len())
            .unwrap_or(0);
        Ok(removed)
    }

    fn find_local_entity(&self, account: &str, file_name: &str) -> Option<LocalEntity> {
        self.entities
            .get(&(account.to_string(), file_name.to_string()))
            .map(|entry| entry.value().clone())
    }

    fn save_file_record(&self, record: &FileRecord) -> Result<(), StoreError> {
        self.insert_record(record.clone());
        Ok(())
    }

    fn file_records(&self, account: &str, server_url: &str) -> Vec<FileRecord> {
        self.records
            .get(&(account.to_string(), server_url.to_string()))
            .map(|entry| entry.value().values().cloned().collect())
            .unwrap_or_default()
    }
}
