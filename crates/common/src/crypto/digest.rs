//! Streaming SHA-256 fingerprints
//!
//! The fingerprint recorded on the ledger is the digest of the *plaintext*
//! artifact, taken before encryption. Retrieval recomputes it over the
//! decrypted bytes, so a match ties the recovered plaintext back to what the
//! sender fingerprinted at publish time independent of the storage layers.

use std::fmt;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

/// Size of a SHA-256 digest in bytes
pub const DIGEST_SIZE: usize = 32;
/// Read size for streaming digests
pub const CHUNK_SIZE: usize = 4096;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DigestParseError {
    #[error("invalid digest length, expected {DIGEST_SIZE} bytes, got {0}")]
    Length(usize),
    #[error("invalid digest hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

/// SHA-256 digest of an artifact's plaintext
///
/// Rendered as 64 lowercase hex characters, which is also its
/// serialized form in ledger records.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; DIGEST_SIZE]);

impl ContentDigest {
    pub fn as_bytes(&self) -> &[u8; DIGEST_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, DigestParseError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != DIGEST_SIZE {
            return Err(DigestParseError::Length(bytes.len()));
        }
        let mut buff = [0u8; DIGEST_SIZE];
        buff.copy_from_slice(&bytes);
        Ok(Self(buff))
    }
}

impl From<[u8; DIGEST_SIZE]> for ContentDigest {
    fn from(bytes: [u8; DIGEST_SIZE]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({})", self.to_hex())
    }
}

impl Serialize for ContentDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ContentDigest::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Digest a byte source in `CHUNK_SIZE` reads.
///
/// # Errors
///
/// Propagates any read error other than `Interrupted`, which is retried.
pub fn digest_reader<R: Read>(mut reader: R) -> std::io::Result<ContentDigest> {
    let mut hasher = Sha256::new();
    let mut chunk = [0u8; CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&chunk[..n]);
    }
    Ok(ContentDigest(hasher.finalize().into()))
}

/// Digest an in-memory buffer, fed to the hasher in `CHUNK_SIZE` pieces
pub fn digest_bytes(data: &[u8]) -> ContentDigest {
    let mut hasher = Sha256::new();
    for chunk in data.chunks(CHUNK_SIZE) {
        hasher.update(chunk);
    }
    ContentDigest(hasher.finalize().into())
}

/// Digest a file on disk without loading it into memory
pub fn digest_file(path: &Path) -> std::io::Result<ContentDigest> {
    let file = File::open(path)?;
    digest_reader(file)
}
