use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use super::provider::{SecretStore, SecretStoreError};

/// In-memory secret store backed by a HashMap
#[derive(Debug, Clone, Default)]
pub struct MemorySecretStore {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored secrets
    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn put(&self, name: &str, value: String) -> Result<(), SecretStoreError> {
        let mut inner = self.inner.write().map_err(|e| {
            SecretStoreError::Transport(format!("failed to acquire write lock: {}", e))
        })?;
        inner.insert(name.to_string(), value);
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<String, SecretStoreError> {
        let inner = self.inner.read().map_err(|e| {
            SecretStoreError::Transport(format!("failed to acquire read lock: {}", e))
        })?;
        inner
            .get(name)
            .cloned()
            .ok_or_else(|| SecretStoreError::NotFound(name.to_string()))
    }
}
