// ABOUTME: Persistence adapter that mirrors the whole record collection to one storage key.
// ABOUTME: Loads once at startup (empty on absent or unparsable data) and rewrites the blob on every save.

use thiserror::Error;

use crate::model::StudentRecord;
use crate::storage::{StorageError, StorageProvider};

/// Storage key used when none is configured.
pub const DEFAULT_KEY: &str = "students";

/// Errors that can occur while writing the collection.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Serialize records, in order, as a JSON array.
pub fn encode_records<'a, I>(records: I) -> Result<String, serde_json::Error>
where
    I: IntoIterator<Item = &'a StudentRecord>,
{
    let records: Vec<&StudentRecord> = records.into_iter().collect();
    serde_json::to_string(&records)
}

/// Parse a JSON array of records.
pub fn decode_records(blob: &str) -> Result<Vec<StudentRecord>, serde_json::Error> {
    serde_json::from_str(blob)
}

/// Reads and writes the full collection under a single key of a storage
/// provider.
pub struct Persistence<S> {
    provider: S,
    key: String,
}

impl<S: StorageProvider> Persistence<S> {
    pub fn new(provider: S) -> Self {
        Self::with_key(provider, DEFAULT_KEY)
    }

    pub fn with_key(provider: S, key: impl Into<String>) -> Self {
        Self {
            provider,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn provider(&self) -> &S {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut S {
        &mut self.provider
    }

    pub fn into_provider(self) -> S {
        self.provider
    }

    /// Read the stored collection. Absent, unreadable, or unparsable data
    /// yields an empty collection.
    pub fn load(&self) -> Vec<StudentRecord> {
        let blob = match self.provider.read(&self.key) {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                tracing::info!("no records stored under {:?}, starting empty", self.key);
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!("failed to read {:?}, starting empty: {}", self.key, e);
                return Vec::new();
            }
        };

        match decode_records(&blob) {
            Ok(records) => {
                tracing::info!("loaded {} records from {:?}", records.len(), self.key);
                records
            }
            Err(e) => {
                tracing::warn!(
                    "stored data under {:?} is unparsable, starting empty: {}",
                    self.key,
                    e
                );
                Vec::new()
            }
        }
    }

    /// Replace the stored collection with `records`.
    pub fn save<'a, I>(&mut self, records: I) -> Result<(), PersistError>
    where
        I: IntoIterator<Item = &'a StudentRecord>,
    {
        let blob = encode_records(records)?;
        self.provider.write(&self.key, &blob)?;
        Ok(())
    }
}
