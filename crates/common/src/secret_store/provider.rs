use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;

use crate::deadline::TimedOut;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SecretStoreError {
    #[error("secret not found: {0}")]
    NotFound(String),
    #[error("access to secret denied: {0}")]
    Denied(String),
    #[error("secret store unreachable: {0}")]
    Transport(String),
    #[error("malformed secret store response: {0}")]
    Malformed(String),
    #[error("secret store call timed out after {0:?}")]
    Timeout(Duration),
}

impl TimedOut for SecretStoreError {
    fn timed_out(after: Duration) -> Self {
        SecretStoreError::Timeout(after)
    }
}

/// Named storage for opaque text values, e.g. a Vault KV engine.
///
/// Names are logical paths whose first segment is the mount,
///  i.e. `kv-v2/alice_report_0a1b2c3d4e5f`.
#[async_trait]
pub trait SecretStore: Send + Sync + Debug + 'static {
    /// Store `value` under `name`, overwriting any previous value
    async fn put(&self, name: &str, value: String) -> Result<(), SecretStoreError>;

    /// Fetch the value stored under `name`
    ///
    /// Should fail with `SecretStoreError::NotFound` if nothing
    ///  was ever stored under the name.
    async fn get(&self, name: &str) -> Result<String, SecretStoreError>;
}
