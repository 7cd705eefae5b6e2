use crate::domain::ports::KeyValueStorage;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory key/value storage.
///
/// Uses `Arc<RwLock<HashMap<String, String>>>`, so clones share the same data.
/// Backs both the persistent store and the session slot in tests and when no
/// database path is given.
#[derive(Default, Clone)]
pub struct InMemoryStorage {
    items: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryStorage {
    /// Creates a new, empty in-memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStorage for InMemoryStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = self.items.read().await;
        Ok(items.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: String) -> Result<()> {
        let mut items = self.items.write().await;
        items.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.items.write().await;
        items.remove(key);
        Ok(())
    }
}
