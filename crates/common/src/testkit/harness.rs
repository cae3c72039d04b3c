use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use crate::content_store::MemoryContentStore;
use crate::exchange::{Exchange, ExchangeConfig};
use crate::ledger::MemoryLedger;
use crate::secret_store::MemorySecretStore;
use crate::source::{Clock, FixedClock, RandomSource, SeededRandom};

/// An exchange over in-memory collaborators
pub type MemoryExchange = Exchange<MemorySecretStore, MemoryContentStore, MemoryLedger>;

/// Instant the harness clock is frozen at, in seconds since the epoch
///  (2024-05-01T12:30:00Z)
pub const HARNESS_EPOCH: i64 = 1_714_566_600;

/// Shared secret store, content store and ledger, plus deterministic sources
#[derive(Debug)]
pub struct TestHarness {
    pub secrets: MemorySecretStore,
    pub content: MemoryContentStore,
    pub ledger: MemoryLedger,
    config: ExchangeConfig,
    seed: u64,
    spawned: AtomicU64,
    now: DateTime<Utc>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_seed(42)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            secrets: MemorySecretStore::new(),
            content: MemoryContentStore::new(),
            ledger: MemoryLedger::new(),
            config: ExchangeConfig::default(),
            seed,
            spawned: AtomicU64::new(0),
            now: Utc
                .timestamp_opt(HARNESS_EPOCH, 0)
                .single()
                .unwrap_or_default(),
        }
    }

    /// Use `config` for every exchange built from here on
    pub fn with_config(mut self, config: ExchangeConfig) -> Self {
        if config.functions != self.config.functions {
            self.ledger = MemoryLedger::with_functions(config.functions.clone());
        }
        self.config = config;
        self
    }

    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    /// The instant every record is stamped with
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// A fresh random source and the frozen clock.
    ///  Each call seeds its source differently so parties never collide.
    pub fn sources(&self) -> (Arc<dyn RandomSource>, Arc<dyn Clock>) {
        let n = self.spawned.fetch_add(1, Ordering::Relaxed);
        (
            Arc::new(SeededRandom::new(self.seed.wrapping_add(n))),
            Arc::new(FixedClock(self.now)),
        )
    }

    /// A new party sharing this harness's stores
    pub fn exchange(&self) -> MemoryExchange {
        let (random, clock) = self.sources();
        Exchange::new(
            self.secrets.clone(),
            self.content.clone(),
            self.ledger.clone(),
            self.config.clone(),
        )
        .with_sources(random, clock)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn test_parties_share_stores() {
        let harness = TestHarness::new();
        let producer = harness.exchange();
        let consumer = harness.exchange();

        let published = producer
            .publish("alert.txt", b"indicator", "org1", "phishing indicator")
            .await
            .unwrap();
        let retrieved = consumer.retrieve(published.uuid).await.unwrap();

        assert!(retrieved.integrity_ok());
        assert_eq!(retrieved.plaintext, b"indicator");
        assert_eq!(retrieved.record.timestamp, harness.now());
        assert_eq!(harness.secrets.len(), 1);
        assert_eq!(harness.content.len(), 1);
        assert_eq!(harness.ledger.len(), 1);
    }

    #[tokio::test]
    async fn test_parties_draw_distinct_randomness() {
        let harness = TestHarness::new();
        let a = harness
            .exchange()
            .publish("alert.txt", b"same", "org1", "first")
            .await
            .unwrap();
        let b = harness
            .exchange()
            .publish("alert.txt", b"same", "org1", "second")
            .await
            .unwrap();

        assert_ne!(a.uuid, b.uuid);
        assert_ne!(a.record.key_pointer, b.record.key_pointer);
        assert_ne!(a.record.content_id, b.record.content_id);
    }

    #[test]
    fn test_epoch() {
        assert_eq!(
            TestHarness::new().now().to_rfc3339(),
            "2024-05-01T12:30:00+00:00"
        );
    }
}
