/**
 * Artifact encryption primitives.
 *  - Streaming SHA-256 fingerprints
 *  - AES-256-GCM envelopes with 16-byte nonces
 *  - Per-artifact envelope keys
 */
pub mod crypto;
/**
 * Key escrow: naming envelope keys, and storing
 *  and fetching them through a secret store.
 */
pub mod keys;
/**
 * The provenance record anchored on the ledger
 *  for every published artifact.
 */
pub mod record;
/**
 * Publish and retrieve protocols tying the
 *  secret store, content store and ledger together.
 */
pub mod exchange;
/**
 * Collaborator seams. Each is a trait plus an
 *  in-memory provider; network-backed providers
 *  live with the binary.
 */
pub mod content_store;
pub mod ledger;
pub mod secret_store;
/**
 * Injected randomness and time.
 */
pub mod source;
/**
 * In-process harness for integration tests.
 */
pub mod testkit;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;

mod deadline;

pub use deadline::TimedOut;

pub mod prelude {
    pub use crate::content_store::{ContentId, ContentStore, ContentStoreError};
    pub use crate::crypto::{ContentDigest, EnvelopeKey};
    pub use crate::exchange::{
        Exchange, ExchangeConfig, ExchangeError, FailureClass, Integrity, Published, Retrieved,
        Step,
    };
    pub use crate::keys::{KeyId, KeyPointer};
    pub use crate::ledger::{Ledger, LedgerError, LedgerFunctions};
    pub use crate::record::ArtifactRecord;
    pub use crate::secret_store::{SecretStore, SecretStoreError};
    pub use crate::version::build_info;
}
