//! Injected sources of randomness and time
//!
//! Key generation, nonce generation, key naming and record assembly all
//! draw from a [`RandomSource`], and record timestamps come from a
//! [`Clock`]. Production code uses [`OsRandom`] and [`SystemClock`];
//! tests swap in [`SeededRandom`] and [`FixedClock`] to get reproducible
//! identifiers and timestamps.

use std::fmt::Debug;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

#[derive(Debug, thiserror::Error)]
#[error("random source failure: {0}")]
pub struct RandomError(String);

/// A source of cryptographically strong random bytes
pub trait RandomSource: Send + Sync + Debug {
    fn fill(&self, dest: &mut [u8]) -> Result<(), RandomError>;
}

/// Operating system CSPRNG
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill(&self, dest: &mut [u8]) -> Result<(), RandomError> {
        getrandom::getrandom(dest).map_err(|e| RandomError(e.to_string()))
    }
}

/// Deterministic random source seeded from a `u64`.
///
/// Reproducible across runs; never use it outside of tests.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn fill(&self, dest: &mut [u8]) -> Result<(), RandomError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|e| RandomError(format!("failed to acquire rng lock: {}", e)))?;
        rng.fill_bytes(dest);
        Ok(())
    }
}

/// Wall-clock abstraction used for record timestamps
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a single instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
