use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{Record, RecordStore, StoreError};

/// Store persisted as one JSON object keyed by record key.
///
/// Every save rewrites the file through a sibling temp file and a rename, so
/// readers never observe a half-written document.
pub struct JsonFileStore<T> {
    path: PathBuf,
    records: RwLock<BTreeMap<String, T>>,
}

impl<T: Record> JsonFileStore<T> {
    /// Load the store from `path`, starting empty when the file does not exist.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let records = match tokio::fs::read_to_string(&path).await {
            Ok(data) if data.trim().is_empty() => BTreeMap::new(),
            Ok(data) => serde_json::from_str(&data)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, records: &BTreeMap<String, T>) -> Result<(), StoreError> {
        let data = serde_json::to_string_pretty(records)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, &data)
            .await
            .map_err(|source| StoreError::Io {
                path: temp_path.clone(),
                source,
            })?;

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })
    }
}

#[async_trait]
impl<T: Record> RecordStore<T> for JsonFileStore<T> {
    async fn find(&self, key: &str) -> Result<Option<T>, StoreError> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn save(&self, record: T) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let key = record.key().to_string();
        let previous = records.insert(key.clone(), record);

        if let Err(err) = self.persist(&records).await {
            // Keep memory consistent with what is on disk.
            match previous {
                Some(previous) => records.insert(key, previous),
                None => records.remove(&key),
            };
            tracing::error!(target: "bookbank-db", error = %err, "failed to persist record");
            return Err(err);
        }

        Ok(())
    }

    async fn list(&self) -> Result<Vec<T>, StoreError> {
        Ok(self.records.read().await.values().cloned().collect())
    }
}
