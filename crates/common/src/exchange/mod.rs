//! Publish and retrieve protocols over the three storage planes
//!
//! Publishing seals an artifact under a fresh key, escrows the key in the
//! secret store, deposits the sealed blob in the content store and anchors an
//! [`ArtifactRecord`] on the ledger. Retrieval walks the record back to the
//! blob and the key, opens the blob and checks the plaintext against the
//! fingerprint the sender anchored.
//!
//! Each protocol run is a straight line of awaited collaborator calls, each
//! bounded by [`ExchangeConfig::call_timeout`]. Nothing is retried and nothing
//! is rolled back: a publish failing after the blob was deposited leaves the
//! blob orphaned.

mod error;
mod publish;
mod retrieve;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::content_store::ContentStore;
use crate::crypto::ContentDigest;
use crate::keys::{KeyManager, DEFAULT_MOUNT};
use crate::ledger::{Ledger, LedgerFunctions, RecordLedger};
use crate::record::ArtifactRecord;
use crate::secret_store::SecretStore;
use crate::source::{Clock, OsRandom, RandomSource, SystemClock};

pub use error::{ExchangeError, FailureClass, Step};

/// Deadline applied to every collaborator call unless configured otherwise
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeConfig {
    /// Secret store mount keys are escrowed under
    pub mount: String,
    pub call_timeout: Duration,
    pub functions: LedgerFunctions,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            mount: DEFAULT_MOUNT.to_string(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
            functions: LedgerFunctions::default(),
        }
    }
}

/// Outcome of a successful publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub uuid: Uuid,
    pub record: ArtifactRecord,
}

/// Whether retrieved plaintext matches the fingerprint on the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Integrity {
    Verified,
    Mismatch {
        expected: ContentDigest,
        actual: ContentDigest,
    },
}

/// Outcome of a retrieval.
///  The plaintext is delivered even on an integrity mismatch;
///  check [`Retrieved::integrity_ok`] before trusting it.
#[derive(Clone, PartialEq, Eq)]
pub struct Retrieved {
    pub record: ArtifactRecord,
    pub plaintext: Vec<u8>,
    pub integrity: Integrity,
}

impl Retrieved {
    pub fn integrity_ok(&self) -> bool {
        self.integrity == Integrity::Verified
    }
}

impl fmt::Debug for Retrieved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retrieved")
            .field("record", &self.record)
            .field("plaintext", &format_args!("{} bytes", self.plaintext.len()))
            .field("integrity", &self.integrity)
            .finish()
    }
}

/// Orchestrates artifact exchange over a secret store, a content store
///  and a ledger
#[derive(Debug)]
pub struct Exchange<S, C, L> {
    keys: KeyManager<S>,
    content: C,
    records: RecordLedger<L>,
    call_timeout: Duration,
    random: Arc<dyn RandomSource>,
    clock: Arc<dyn Clock>,
}

impl<S, C, L> Exchange<S, C, L>
where
    S: SecretStore,
    C: ContentStore,
    L: Ledger,
{
    /// Build an exchange drawing randomness from the OS and time
    ///  from the system clock
    pub fn new(secrets: S, content: C, ledger: L, config: ExchangeConfig) -> Self {
        Self {
            keys: KeyManager::new(secrets, config.mount, config.call_timeout),
            content,
            records: RecordLedger::new(ledger, config.functions, config.call_timeout),
            call_timeout: config.call_timeout,
            random: Arc::new(OsRandom),
            clock: Arc::new(SystemClock),
        }
    }

    /// Swap the random source and clock, e.g. for reproducible tests
    pub fn with_sources(mut self, random: Arc<dyn RandomSource>, clock: Arc<dyn Clock>) -> Self {
        self.random = random;
        self.clock = clock;
        self
    }

    pub fn keys(&self) -> &KeyManager<S> {
        &self.keys
    }

    pub fn content_store(&self) -> &C {
        &self.content
    }

    pub fn records(&self) -> &RecordLedger<L> {
        &self.records
    }

    /// Read a record from the ledger without touching the other stores
    pub async fn read_record(&self, uuid: Uuid) -> Result<ArtifactRecord, ExchangeError> {
        self.records
            .read(uuid)
            .await
            .map_err(|source| ExchangeError::LedgerFailure {
                step: Step::ReadRecord,
                source,
            })
    }

    /// Every record on the ledger, fetched `page_size` at a time
    pub async fn list_records(&self, page_size: u32) -> Result<Vec<ArtifactRecord>, ExchangeError> {
        let records = self
            .records
            .list_all(page_size)
            .await
            .map_err(|source| ExchangeError::LedgerFailure {
                step: Step::ListRecords,
                source,
            })?;
        tracing::debug!(count = records.len(), page_size, "listed records");
        Ok(records)
    }

    /// Remove a record from the ledger.
    ///  The blob and the escrowed key stay where they are.
    pub async fn delete_record(&self, uuid: Uuid) -> Result<(), ExchangeError> {
        self.records
            .delete(uuid)
            .await
            .map_err(|source| ExchangeError::LedgerFailure {
                step: Step::DeleteRecord,
                source,
            })?;
        tracing::info!(uuid = %uuid, "record deleted");
        Ok(())
    }
}
