// # Memory State Store
//
// In-memory implementation of StateStore.
//
// ## Crash Behavior
//
// All state is lost when the process exits, so every invocation looks like a
// first run and publishes unconditionally. Acceptable when the destination
// treats a repeat publish of the same value as a harmless overwrite.
//
// ## When to Use
//
// - Tests
// - Embedding ipup where persistence is handled elsewhere

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::config::StateStoreConfig;
use crate::traits::state_store::{StateRecord, StateStore, StateStoreFactory};

/// In-memory state store implementation
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    inner: Arc<RwLock<Option<StateRecord>>>,
}

impl MemoryStateStore {
    /// Create a new empty memory state store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with a record (test convenience)
    pub fn with_record(record: StateRecord) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(record))),
        }
    }

    /// Drop the record, if any
    pub async fn clear(&self) {
        *self.inner.write().await = None;
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self) -> Result<Option<StateRecord>, Error> {
        Ok(self.inner.read().await.clone())
    }

    async fn save(&self, record: &StateRecord) -> Result<(), Error> {
        *self.inner.write().await = Some(record.clone());
        Ok(())
    }
}

/// Factory for creating memory state stores
pub struct MemoryStateStoreFactory;

impl StateStoreFactory for MemoryStateStoreFactory {
    fn create(&self, config: &StateStoreConfig) -> Result<Box<dyn StateStore>, Error> {
        match config {
            StateStoreConfig::Memory => Ok(Box::new(MemoryStateStore::new())),
            _ => Err(Error::config("invalid config for memory state store")),
        }
    }
}
