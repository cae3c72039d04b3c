use std::fmt::{self, Debug, Display};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::deadline::TimedOut;

/// Opaque handle a content store hands back for a stored blob.
///  Never derived locally from the blob; always the store's answer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentStoreError {
    #[error("content not found: {0}")]
    NotFound(ContentId),
    #[error("access to content denied: {0}")]
    Denied(String),
    #[error("content store unreachable: {0}")]
    Transport(String),
    #[error("malformed content store response: {0}")]
    Malformed(String),
    #[error("content store call timed out after {0:?}")]
    Timeout(Duration),
}

impl TimedOut for ContentStoreError {
    fn timed_out(after: Duration) -> Self {
        ContentStoreError::Timeout(after)
    }
}

/// Content-addressed blob storage, e.g. an IPFS cluster
#[async_trait]
pub trait ContentStore: Send + Sync + Debug + 'static {
    /// Store a blob and return the identifier it is addressed by
    async fn put(&self, data: Bytes) -> Result<ContentId, ContentStoreError>;

    /// Fetch a blob by identifier
    async fn get(&self, id: &ContentId) -> Result<Bytes, ContentStoreError>;
}
