use super::{Record, RecordStore, StoreError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

struct Table<R> {
    rows: BTreeMap<i32, R>,
    last_id: i32,
}

/// Process-local record store, one instance per entity type.
///
/// Identities start at 1 and are never reused, like a serial column.
pub struct InMemoryStore<R> {
    table: RwLock<Table<R>>,
}

impl<R: Record> InMemoryStore<R> {
    /// Initialize a new empty in-memory store
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table {
                rows: BTreeMap::new(),
                last_id: 0,
            }),
        }
    }
}

impl<R: Record> Default for InMemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Record> RecordStore<R> for InMemoryStore<R> {
    async fn insert(&self, new: R::New) -> Result<R, StoreError> {
        let mut table = self.table.write().await;
        let id = table
            .last_id
            .checked_add(1)
            .ok_or_else(|| StoreError::Backend(format!("{} identity exhausted", R::KIND)))?;
        let record = R::create(id, new)?;
        table.last_id = id;
        table.rows.insert(record.id(), record.clone());
        Ok(record)
    }

    async fn get(&self, id: i32) -> Result<R, StoreError> {
        self.table
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn list(&self) -> Result<Vec<R>, StoreError> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn update(&self, id: i32, patch: R::Patch) -> Result<R, StoreError> {
        let mut table = self.table.write().await;
        let row = table.rows.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        // Apply to a copy so a rejected patch leaves the row untouched
        let mut updated = row.clone();
        updated.apply(patch)?;
        *row = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: i32) -> Result<(), StoreError> {
        self.table
            .write()
            .await
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }

    async fn health_check(&self) -> Result<(), String> {
        Ok(())
    }
}
