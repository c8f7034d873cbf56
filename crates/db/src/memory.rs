use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{Record, RecordStore, StoreError};

/// Process-local store; contents vanish with the process.
pub struct MemoryStore<T> {
    records: RwLock<BTreeMap<String, T>>,
}

impl<T: Record> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<T: Record> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Record> RecordStore<T> for MemoryStore<T> {
    async fn find(&self, key: &str) -> Result<Option<T>, StoreError> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn save(&self, record: T) -> Result<(), StoreError> {
        let key = record.key().to_string();
        self.records.write().await.insert(key, record);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<T>, StoreError> {
        Ok(self.records.read().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{shelf, Shelf};

    #[tokio::test]
    async fn find_missing_key_returns_none() {
        let store = MemoryStore::<Shelf>::new();
        assert!(store.find("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_replaces_record_with_same_key() {
        let store = MemoryStore::<Shelf>::new();
        store.save(shelf("fiction", 1)).await.unwrap();
        store.save(shelf("fiction", 7)).await.unwrap();

        assert_eq!(store.find("fiction").await.unwrap(), Some(shelf("fiction", 7)));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_is_ordered_by_key() {
        let store = MemoryStore::<Shelf>::new();
        store.save(shelf("technology", 1)).await.unwrap();
        store.save(shelf("fiction", 1)).await.unwrap();
        store.save(shelf("science", 1)).await.unwrap();

        let names: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["fiction", "science", "technology"]);
    }
}
