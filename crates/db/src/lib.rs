//! Keyed record storage for bookbank.
//!
//! Callers depend on [`RecordStore`] only; the backend is picked from
//! [`DatabaseSettings`] by [`open`].

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bookbank_kernel::settings::{DatabaseBackend, DatabaseSettings};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// A value addressable by a unique natural key.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    fn key(&self) -> &str;
}

/// Errors raised by store backends
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Keyed get/put contract every backend implements.
#[async_trait]
pub trait RecordStore<T: Record>: Send + Sync {
    /// Look up a record by key
    async fn find(&self, key: &str) -> Result<Option<T>, StoreError>;

    /// Insert or replace the record stored under `record.key()`
    async fn save(&self, record: T) -> Result<(), StoreError>;

    /// All records ordered by key
    async fn list(&self) -> Result<Vec<T>, StoreError>;
}

/// Open the backend selected by the database settings.
pub async fn open<T: Record>(
    settings: &DatabaseSettings,
) -> Result<Arc<dyn RecordStore<T>>, StoreError> {
    match settings.backend {
        DatabaseBackend::Memory => {
            tracing::info!(target: "bookbank-db", backend = "memory", "record store ready");
            Ok(Arc::new(MemoryStore::<T>::new()))
        }
        DatabaseBackend::File => {
            let store = JsonFileStore::<T>::open(&settings.path).await?;
            tracing::info!(
                target: "bookbank-db",
                backend = "file",
                path = %settings.path.display(),
                "record store ready"
            );
            Ok(Arc::new(store))
        }
    }
}
