use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use chrono::Utc;
use uuid::Uuid;

use crate::{Collection, Document, DocumentStore, NewDocument, Result, StoreError};

/// In-memory document store used by tests. Mirrors `PgStore` semantics:
/// capped lists ordered by insertion, equality filter on `user_id`.
pub struct MemStore {
    collections: Mutex<HashMap<Collection, Vec<Document>>>,
    available: AtomicBool,
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            collections: Mutex::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate a connectivity outage: all subsequent operations fail
    /// with `StoreError::Unavailable` until re-enabled.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemStore {
    async fn insert(&self, collection: Collection, doc: NewDocument) -> Result<Document> {
        self.check_available()?;
        let stored = Document {
            id: Uuid::new_v4(),
            user_id: doc.user_id,
            created_at: Utc::now(),
            fields: doc.fields,
        };
        self.collections
            .lock()
            .unwrap()
            .entry(collection)
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn list(
        &self,
        collection: Collection,
        user_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Document>> {
        self.check_available()?;
        let collections = self.collections.lock().unwrap();
        let docs = collections
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| user_id.map_or(true, |u| d.user_id == u))
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(docs)
    }

    async fn get(&self, collection: Collection, id: Uuid) -> Result<Option<Document>> {
        self.check_available()?;
        let collections = self.collections.lock().unwrap();
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id).cloned()))
    }

    async fn count(&self, collection: Collection) -> Result<u64> {
        self.check_available()?;
        let collections = self.collections.lock().unwrap();
        Ok(collections.get(&collection).map(|d| d.len()).unwrap_or(0) as u64)
    }

    async fn field_values(&self, collection: Collection, field: &str) -> Result<Vec<String>> {
        self.check_available()?;
        let collections = self.collections.lock().unwrap();
        let mut values: Vec<String> = collections
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter_map(|d| d.fields.get(field).and_then(|v| v.as_str()))
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        values.sort();
        values.dedup();
        Ok(values)
    }

    async fn ping(&self) -> Result<()> {
        self.check_available()
    }
}
