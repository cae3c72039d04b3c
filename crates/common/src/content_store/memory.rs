use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use bytes::Bytes;
use cid::Cid;
use multihash::Multihash;

use super::provider::{ContentId, ContentStore, ContentStoreError};
use crate::crypto::digest_bytes;

/// Multicodec code for raw binary blocks
const RAW_CODEC: u64 = 0x55;
/// Multihash code for sha2-256
const SHA2_256_CODE: u64 = 0x12;

/// In-memory content store addressing blobs by CIDv1 (raw, sha2-256),
///  the same identifiers an IPFS node hands out for a single raw block
#[derive(Debug, Clone, Default)]
pub struct MemoryContentStore {
    inner: Arc<RwLock<HashMap<ContentId, Bytes>>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs
    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn address(data: &[u8]) -> Result<ContentId, ContentStoreError> {
        let digest = digest_bytes(data);
        let hash = Multihash::<64>::wrap(SHA2_256_CODE, digest.as_bytes())
            .map_err(|e| ContentStoreError::Malformed(e.to_string()))?;
        Ok(ContentId::new(Cid::new_v1(RAW_CODEC, hash).to_string()))
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn put(&self, data: Bytes) -> Result<ContentId, ContentStoreError> {
        let id = Self::address(&data)?;
        let mut inner = self.inner.write().map_err(|e| {
            ContentStoreError::Transport(format!("failed to acquire write lock: {}", e))
        })?;
        inner.insert(id.clone(), data);
        Ok(id)
    }

    async fn get(&self, id: &ContentId) -> Result<Bytes, ContentStoreError> {
        let inner = self.inner.read().map_err(|e| {
            ContentStoreError::Transport(format!("failed to acquire read lock: {}", e))
        })?;
        inner
            .get(id)
            .cloned()
            .ok_or_else(|| ContentStoreError::NotFound(id.clone()))
    }
}
