use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use super::envelope::EnvelopeError;
use crate::source::{RandomError, RandomSource};

/// Size of an envelope key in bytes (256 bits)
pub const KEY_SIZE: usize = 32;

/// A 256-bit symmetric key encrypting exactly one artifact
///
/// Zeroized on drop. `Debug` never prints key material.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct EnvelopeKey([u8; KEY_SIZE]);

impl EnvelopeKey {
    /// Generate a fresh key from the given random source
    pub fn generate(random: &dyn RandomSource) -> Result<Self, RandomError> {
        let mut buff = [0u8; KEY_SIZE];
        random.fill(&mut buff)?;
        Ok(Self(buff))
    }

    /// Create a key from a byte slice
    ///
    /// # Errors
    ///
    /// Returns an error if the slice length is not exactly `KEY_SIZE` bytes.
    pub fn from_slice(data: &[u8]) -> Result<Self, EnvelopeError> {
        if data.len() != KEY_SIZE {
            return Err(EnvelopeError::InvalidKeyLength {
                expected: KEY_SIZE,
                actual: data.len(),
            });
        }
        let mut buff = [0u8; KEY_SIZE];
        buff.copy_from_slice(data);
        Ok(Self(buff))
    }

    /// Raw key bytes. Avoid logging or persisting these.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl From<[u8; KEY_SIZE]> for EnvelopeKey {
    fn from(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for EnvelopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EnvelopeKey([REDACTED])")
    }
}
