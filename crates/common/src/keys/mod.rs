//! Envelope key escrow
//!
//! Each artifact's key is named after its sender and file, stored in the
//! secret store under a fixed mount, and referenced from the ledger record by
//! a pointer of the form `{mount}/data/{key-id}`. Retrieval walks the pointer
//! back to the key id and fetches the key.
//!
//! Keys cross the secret-store boundary base64 encoded, since the store only
//! holds text values.

use std::fmt::{self, Display};
use std::path::Path;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::crypto::EnvelopeKey;
use crate::deadline::bounded;
use crate::secret_store::{SecretStore, SecretStoreError};
use crate::source::{RandomError, RandomSource};

/// Mount used when none is configured
pub const DEFAULT_MOUNT: &str = "kv-v2";
/// Random bytes in a key id's disambiguating suffix (hex encoded, 12 chars)
pub const KEY_ID_SUFFIX_BYTES: usize = 6;

const ANONYMOUS_SENDER: &str = "anonymous";
const UNNAMED_ARTIFACT: &str = "artifact";

#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("key {key_id} unavailable: {source}")]
    Unavailable {
        key_id: KeyId,
        #[source]
        source: SecretStoreError,
    },
    #[error("key {key_id} is malformed: {reason}")]
    Malformed { key_id: KeyId, reason: String },
    #[error("key pointer {0:?} does not name a key")]
    InvalidPointer(String),
}

/// Name of one artifact's key within the secret store mount
///
/// `{sender}_{artifact-stem}_{12 hex chars}`. Only `[A-Za-z0-9-]` appear in
/// the sender and stem, so the id is always a single safe path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyId(String);

impl KeyId {
    /// Derive a fresh key id for an artifact
    ///
    /// # Arguments
    /// * `sender` - The publishing organization
    /// * `artifact_name` - The artifact's file name or path; only the base
    ///   name up to its first `.` is used
    /// * `random` - Source for the disambiguating suffix
    pub fn for_artifact(
        sender: &str,
        artifact_name: &str,
        random: &dyn RandomSource,
    ) -> Result<Self, RandomError> {
        let mut suffix = [0u8; KEY_ID_SUFFIX_BYTES];
        random.fill(&mut suffix)?;

        let sender = sanitize(sender, ANONYMOUS_SENDER);
        let stem = sanitize(artifact_stem(artifact_name), UNNAMED_ARTIFACT);
        Ok(Self(format!("{}_{}_{}", sender, stem, hex::encode(suffix))))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Base name of `artifact_name` with everything from the first `.` dropped
fn artifact_stem(artifact_name: &str) -> &str {
    let base = Path::new(artifact_name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("");
    base.split('.').next().unwrap_or("")
}

fn sanitize(component: &str, fallback: &str) -> String {
    let cleaned: String = component
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();
    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        cleaned
    }
}

/// Path recorded on the ledger telling consumers where a key lives
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyPointer(String);

impl KeyPointer {
    pub fn new(pointer: impl Into<String>) -> Self {
        Self(pointer.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The key id is the last `/`-separated segment of the pointer
    pub fn key_id(&self) -> Result<KeyId, KeyError> {
        match self.0.rsplit('/').next() {
            Some(id) if !id.is_empty() => Ok(KeyId(id.to_string())),
            _ => Err(KeyError::InvalidPointer(self.0.clone())),
        }
    }
}

impl Display for KeyPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stores and fetches envelope keys through a secret store
#[derive(Debug, Clone)]
pub struct KeyManager<S> {
    store: S,
    mount: String,
    timeout: Duration,
}

impl<S: SecretStore> KeyManager<S> {
    pub fn new(store: S, mount: impl Into<String>, timeout: Duration) -> Self {
        Self {
            store,
            mount: mount.into(),
            timeout,
        }
    }

    pub fn mount(&self) -> &str {
        &self.mount
    }

    pub fn store_ref(&self) -> &S {
        &self.store
    }

    /// Ledger pointer for a key id under this manager's mount
    pub fn pointer_for(&self, key_id: &KeyId) -> KeyPointer {
        KeyPointer(format!("{}/data/{}", self.mount, key_id))
    }

    fn secret_name(&self, key_id: &KeyId) -> String {
        format!("{}/{}", self.mount, key_id)
    }

    /// Escrow `key` under `key_id`, returning the pointer to record
    pub async fn store(&self, key_id: &KeyId, key: &EnvelopeKey) -> Result<KeyPointer, KeyError> {
        let encoded = STANDARD.encode(key.as_bytes());
        bounded(self.timeout, self.store.put(&self.secret_name(key_id), encoded))
            .await
            .map_err(|source| KeyError::Unavailable {
                key_id: key_id.clone(),
                source,
            })?;
        tracing::debug!(key_id = %key_id, mount = %self.mount, "envelope key stored");
        Ok(self.pointer_for(key_id))
    }

    /// Fetch the key escrowed under `key_id`. Never retries.
    pub async fn retrieve(&self, key_id: &KeyId) -> Result<EnvelopeKey, KeyError> {
        let encoded = bounded(self.timeout, self.store.get(&self.secret_name(key_id)))
            .await
            .map_err(|source| KeyError::Unavailable {
                key_id: key_id.clone(),
                source,
            })?;

        let raw = STANDARD
            .decode(encoded.trim())
            .map_err(|e| KeyError::Malformed {
                key_id: key_id.clone(),
                reason: e.to_string(),
            })?;
        let key = EnvelopeKey::from_slice(&raw).map_err(|e| KeyError::Malformed {
            key_id: key_id.clone(),
            reason: e.to_string(),
        })?;
        tracing::debug!(key_id = %key_id, mount = %self.mount, "envelope key retrieved");
        Ok(key)
    }
}
