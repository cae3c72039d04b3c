//! Shared test utilities for exchange integration tests
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use common::content_store::{ContentId, ContentStore, ContentStoreError, MemoryContentStore};
use common::exchange::{Exchange, ExchangeConfig};
use common::ledger::{Ledger, LedgerError, MemoryLedger};
use common::secret_store::{SecretStore, SecretStoreError};
use common::testkit::TestHarness;

/// A 10 KB text artifact
pub fn alert_bytes() -> Vec<u8> {
    let line = b"indicator: hxxp://login-verify.example/reset ip=203.0.113.7\n";
    line.iter().copied().cycle().take(10 * 1024).collect()
}

/// Write `data` to `name` inside a fresh temp dir
pub fn artifact_on_disk(name: &str, data: &[u8]) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    std::fs::write(&path, data).unwrap();
    (dir, path)
}

/// Rewrites ledger read results on the way out
#[derive(Debug, Clone)]
pub struct TamperingLedger {
    pub inner: MemoryLedger,
    edits: Arc<Mutex<Vec<(String, Value)>>>,
}

impl TamperingLedger {
    pub fn new(inner: MemoryLedger) -> Self {
        Self {
            inner,
            edits: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Overwrite `field` in every record read back from now on
    pub fn overwrite(&self, field: &str, value: impl Into<Value>) {
        self.edits
            .lock()
            .unwrap()
            .push((field.to_string(), value.into()));
    }
}

#[async_trait]
impl Ledger for TamperingLedger {
    async fn invoke(&self, function: &str, args: &[String]) -> Result<Value, LedgerError> {
        let mut value = self.inner.invoke(function, args).await?;
        if function == "ReadRecord" {
            for (field, replacement) in self.edits.lock().unwrap().iter() {
                value[field.as_str()] = replacement.clone();
            }
        }
        Ok(value)
    }
}

/// Flips one byte of every blob it hands back
#[derive(Debug, Clone)]
pub struct CorruptingContentStore {
    pub inner: MemoryContentStore,
    pub offset: usize,
}

#[async_trait]
impl ContentStore for CorruptingContentStore {
    async fn put(&self, data: Bytes) -> Result<ContentId, ContentStoreError> {
        self.inner.put(data).await
    }

    async fn get(&self, id: &ContentId) -> Result<Bytes, ContentStoreError> {
        let mut blob = self.inner.get(id).await?.to_vec();
        let at = self.offset.min(blob.len().saturating_sub(1));
        blob[at] ^= 0x01;
        Ok(Bytes::from(blob))
    }
}

/// Hands back blobs with their last bytes cut off
#[derive(Debug, Clone)]
pub struct TruncatingContentStore {
    pub inner: MemoryContentStore,
    pub keep: usize,
}

#[async_trait]
impl ContentStore for TruncatingContentStore {
    async fn put(&self, data: Bytes) -> Result<ContentId, ContentStoreError> {
        self.inner.put(data).await
    }

    async fn get(&self, id: &ContentId) -> Result<Bytes, ContentStoreError> {
        let blob = self.inner.get(id).await?;
        Ok(blob.slice(..self.keep.min(blob.len())))
    }
}

/// Never answers
#[derive(Debug, Clone, Copy)]
pub struct Stalled;

#[async_trait]
impl SecretStore for Stalled {
    async fn put(&self, _name: &str, _value: String) -> Result<(), SecretStoreError> {
        std::future::pending().await
    }

    async fn get(&self, _name: &str) -> Result<String, SecretStoreError> {
        std::future::pending().await
    }
}

#[async_trait]
impl ContentStore for Stalled {
    async fn put(&self, _data: Bytes) -> Result<ContentId, ContentStoreError> {
        std::future::pending().await
    }

    async fn get(&self, _id: &ContentId) -> Result<Bytes, ContentStoreError> {
        std::future::pending().await
    }
}

#[async_trait]
impl Ledger for Stalled {
    async fn invoke(&self, _function: &str, _args: &[String]) -> Result<Value, LedgerError> {
        std::future::pending().await
    }
}

pub const SHORT_TIMEOUT: Duration = Duration::from_millis(500);

pub fn short_timeout_config() -> ExchangeConfig {
    ExchangeConfig {
        call_timeout: SHORT_TIMEOUT,
        ..ExchangeConfig::default()
    }
}

/// Build an exchange from arbitrary collaborators with the harness's sources
pub fn exchange_over<S, C, L>(
    harness: &TestHarness,
    secrets: S,
    content: C,
    ledger: L,
    config: ExchangeConfig,
) -> Exchange<S, C, L>
where
    S: SecretStore,
    C: ContentStore,
    L: Ledger,
{
    let (random, clock) = harness.sources();
    Exchange::new(secrets, content, ledger, config).with_sources(random, clock)
}
