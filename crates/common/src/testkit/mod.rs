/// In-process harness for exchange integration tests
///
/// Wires exchanges over shared in-memory collaborators so a test can
/// publish as one party and retrieve as another without any external
/// infrastructure. Randomness is seeded and the clock frozen, so runs
/// are reproducible.
///
/// # Example
///
/// ```rust,ignore
/// use common::testkit::TestHarness;
///
/// #[tokio::test]
/// async fn test_hand_off() {
///     let harness = TestHarness::new();
///     let producer = harness.exchange();
///     let consumer = harness.exchange();
///
///     let published = producer
///         .publish("alert.txt", b"indicator", "org1", "phishing indicator")
///         .await
///         .unwrap();
///     let retrieved = consumer.retrieve(published.uuid).await.unwrap();
///     assert!(retrieved.integrity_ok());
/// }
/// ```
mod harness;

pub use harness::{MemoryExchange, TestHarness, HARNESS_EPOCH};
