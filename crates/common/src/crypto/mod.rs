//! Cryptographic primitives for artifact exchange
//!
//! - **Fingerprinting**: streaming SHA-256 over the plaintext, anchored on the
//!   ledger so retrieval can verify end-to-end integrity
//! - **Envelope encryption**: AES-256-GCM with a fresh per-artifact key and a
//!   fresh 16-byte nonce per seal
//!
//! # Security Model
//!
//! ## Per-artifact keys
//! Every artifact gets its own `EnvelopeKey`, escrowed in the secret store and
//! never reused. Losing one key exposes exactly one artifact.
//!
//! ## Two independent checks
//! The AEAD tag proves a blob was produced under its key and not altered in the
//! content store. The ledger fingerprint proves the decrypted bytes are the ones
//! the sender fingerprinted. A record pointing at the wrong (but authentic) blob
//! passes the first check and fails the second.

mod digest;
mod envelope;
mod key;

pub use digest::{
    digest_bytes, digest_file, digest_reader, ContentDigest, DigestParseError, CHUNK_SIZE,
    DIGEST_SIZE,
};
pub use envelope::{
    open, open_bytes, seal, Envelope, EnvelopeError, MIN_ENVELOPE_SIZE, NONCE_SIZE, TAG_SIZE,
};
pub use key::{EnvelopeKey, KEY_SIZE};
