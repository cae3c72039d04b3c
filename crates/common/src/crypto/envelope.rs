//! Artifact encryption using AES-256-GCM
//!
//! Every artifact is sealed under its own [`EnvelopeKey`] with a nonce drawn
//! fresh from the random source on every call. The serialized blob is:
//!
//! ```text
//! nonce (16 bytes) || ciphertext (N bytes) || tag (16 bytes)
//! ```
//!
//! The 16-byte nonce is the GCM variant existing deposits were written with,
//! so the layout must not change. Parsing slices by these fixed widths; the
//! ciphertext may contain any byte pattern and is never scanned.

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::AesGcm;

use super::key::EnvelopeKey;
use crate::source::{RandomError, RandomSource};

/// Size of the GCM nonce in bytes
pub const NONCE_SIZE: usize = 16;
/// Size of the GCM authentication tag in bytes
pub const TAG_SIZE: usize = 16;
/// Smallest well-formed blob: an empty plaintext
pub const MIN_ENVELOPE_SIZE: usize = NONCE_SIZE + TAG_SIZE;

/// AES-256-GCM with a 128-bit nonce
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// Errors that can occur during sealing/opening
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("invalid key length, expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },
    #[error("envelope too short: {0} bytes, need at least {MIN_ENVELOPE_SIZE}")]
    Truncated(usize),
    #[error("failed to generate nonce: {0}")]
    Random(#[from] RandomError),
    #[error("encryption failed")]
    Encryption,
    /// Tag mismatch: wrong key, or nonce, ciphertext or tag were altered
    #[error("authentication failed: envelope was tampered with or the key is wrong")]
    Authentication,
}

/// A sealed artifact split into its three fixed regions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub nonce: [u8; NONCE_SIZE],
    pub ciphertext: Vec<u8>,
    pub tag: [u8; TAG_SIZE],
}

impl Envelope {
    /// Serialize to `nonce || ciphertext || tag`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out.extend_from_slice(&self.tag);
        out
    }

    /// Parse `nonce || ciphertext || tag` by fixed widths
    ///
    /// # Errors
    ///
    /// Returns `Truncated` if the blob cannot hold both nonce and tag.
    pub fn from_bytes(data: &[u8]) -> Result<Self, EnvelopeError> {
        if data.len() < MIN_ENVELOPE_SIZE {
            return Err(EnvelopeError::Truncated(data.len()));
        }
        let tag_start = data.len() - TAG_SIZE;

        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&data[..NONCE_SIZE]);
        let mut tag = [0u8; TAG_SIZE];
        tag.copy_from_slice(&data[tag_start..]);

        Ok(Self {
            nonce,
            ciphertext: data[NONCE_SIZE..tag_start].to_vec(),
            tag,
        })
    }

    /// Serialized size in bytes
    pub fn len(&self) -> usize {
        NONCE_SIZE + self.ciphertext.len() + TAG_SIZE
    }

    /// True when the sealed plaintext was empty
    pub fn is_empty(&self) -> bool {
        self.ciphertext.is_empty()
    }
}

fn cipher_for(key: &EnvelopeKey) -> Result<Aes256Gcm16, EnvelopeError> {
    Aes256Gcm16::new_from_slice(key.as_bytes()).map_err(|_| EnvelopeError::InvalidKeyLength {
        expected: super::key::KEY_SIZE,
        actual: key.as_bytes().len(),
    })
}

/// Encrypt `plaintext` under `key` with a fresh random nonce
///
/// # Errors
///
/// Returns an error only if the random source or the cipher fails.
pub fn seal(
    key: &EnvelopeKey,
    plaintext: &[u8],
    random: &dyn RandomSource,
) -> Result<Envelope, EnvelopeError> {
    let mut nonce = [0u8; NONCE_SIZE];
    random.fill(&mut nonce)?;

    let cipher = cipher_for(key)?;
    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(GenericArray::from_slice(&nonce), b"", &mut buffer)
        .map_err(|_| EnvelopeError::Encryption)?;

    let mut tag_bytes = [0u8; TAG_SIZE];
    tag_bytes.copy_from_slice(tag.as_slice());

    Ok(Envelope {
        nonce,
        ciphertext: buffer,
        tag: tag_bytes,
    })
}

/// Decrypt and authenticate an envelope
///
/// # Errors
///
/// Returns `Authentication` if the tag does not verify. No plaintext,
/// partial or otherwise, is returned in that case.
pub fn open(key: &EnvelopeKey, envelope: &Envelope) -> Result<Vec<u8>, EnvelopeError> {
    let cipher = cipher_for(key)?;
    let mut buffer = envelope.ciphertext.clone();
    match cipher.decrypt_in_place_detached(
        GenericArray::from_slice(&envelope.nonce),
        b"",
        &mut buffer,
        GenericArray::from_slice(&envelope.tag),
    ) {
        Ok(()) => Ok(buffer),
        Err(_) => {
            buffer.iter_mut().for_each(|b| *b = 0);
            Err(EnvelopeError::Authentication)
        }
    }
}

/// Parse a serialized blob and decrypt it
pub fn open_bytes(key: &EnvelopeKey, blob: &[u8]) -> Result<Vec<u8>, EnvelopeError> {
    let envelope = Envelope::from_bytes(blob)?;
    open(key, &envelope)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::source::{OsRandom, SeededRandom};
    use std::collections::HashSet;

    fn key() -> EnvelopeKey {
        EnvelopeKey::generate(&OsRandom).unwrap()
    }

    #[test]
    fn test_seal_open_round_trip() {
        let key = key();
        let data = b"hello world, this is a test message for encryption";

        let sealed = seal(&key, data, &OsRandom).unwrap();
        let opened = open(&key, &sealed).unwrap();

        assert_eq!(data.as_slice(), opened.as_slice());
    }

    #[test]
    fn test_round_trip_through_wire_bytes() {
        let key = key();
        for len in [0usize, 1, 15, 16, 17, 4096, 10 * 1024] {
            let data: Vec<u8> = (0..len).map(|i| (i * 7 % 256) as u8).collect();
            let blob = seal(&key, &data, &OsRandom).unwrap().to_bytes();
            assert_eq!(blob.len(), NONCE_SIZE + len + TAG_SIZE);
            assert_eq!(open_bytes(&key, &blob).unwrap(), data, "length {}", len);
        }
    }

    #[test]
    fn test_empty_plaintext() {
        let key = key();
        let sealed = seal(&key, b"", &OsRandom).unwrap();
        assert!(sealed.is_empty());
        assert_eq!(sealed.len(), MIN_ENVELOPE_SIZE);
        assert_eq!(open(&key, &sealed).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_wire_layout_is_fixed_width() {
        let key = key();
        let sealed = seal(&key, b"layout check", &OsRandom).unwrap();
        let blob = sealed.to_bytes();

        assert_eq!(&blob[..NONCE_SIZE], &sealed.nonce);
        assert_eq!(&blob[NONCE_SIZE..blob.len() - TAG_SIZE], sealed.ciphertext.as_slice());
        assert_eq!(&blob[blob.len() - TAG_SIZE..], &sealed.tag);
        assert_eq!(Envelope::from_bytes(&blob).unwrap(), sealed);
    }

    #[test]
    fn test_every_single_bit_flip_is_rejected() {
        let key = key();
        let blob = seal(&key, b"tamper evident payload", &OsRandom)
            .unwrap()
            .to_bytes();

        // Nonce, ciphertext and tag regions
        for byte in 0..blob.len() {
            for bit in 0..8 {
                let mut tampered = blob.clone();
                tampered[byte] ^= 1 << bit;
                assert!(
                    matches!(
                        open_bytes(&key, &tampered),
                        Err(EnvelopeError::Authentication)
                    ),
                    "flip at byte {} bit {} was accepted",
                    byte,
                    bit
                );
            }
        }
    }

    #[test]
    fn test_wrong_key_is_rejected() {
        let sealed = seal(&key(), b"for someone else", &OsRandom).unwrap();
        assert!(matches!(
            open(&key(), &sealed),
            Err(EnvelopeError::Authentication)
        ));
    }

    #[test]
    fn test_truncated_blob() {
        let key = key();
        assert!(matches!(
            open_bytes(&key, &[0u8; MIN_ENVELOPE_SIZE - 1]),
            Err(EnvelopeError::Truncated(31))
        ));
        assert!(matches!(
            open_bytes(&key, &[]),
            Err(EnvelopeError::Truncated(0))
        ));
        // Exactly nonce + tag parses but cannot authenticate garbage
        assert!(matches!(
            open_bytes(&key, &[0u8; MIN_ENVELOPE_SIZE]),
            Err(EnvelopeError::Authentication)
        ));
    }

    #[test]
    fn test_nonces_never_repeat() {
        let key = key();
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            let sealed = seal(&key, b"x", &OsRandom).unwrap();
            assert!(seen.insert(sealed.nonce), "nonce reused");
        }
    }

    #[test]
    fn test_same_plaintext_seals_differently() {
        let key = key();
        let random = SeededRandom::new(11);
        let a = seal(&key, b"same input", &random).unwrap();
        let b = seal(&key, b"same input", &random).unwrap();
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
    }
}
