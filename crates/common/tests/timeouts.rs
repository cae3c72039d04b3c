//! Integration tests for collaborator deadlines

mod common;

use ::common::exchange::{ExchangeError, FailureClass, Step};
use ::common::testkit::TestHarness;

#[tokio::test(start_paused = true)]
async fn test_stalled_secret_store_fails_publish() {
    let harness = TestHarness::new();
    let exchange = common::exchange_over(
        &harness,
        common::Stalled,
        harness.content.clone(),
        harness.ledger.clone(),
        common::short_timeout_config(),
    );

    let err = exchange
        .publish("alert.txt", b"indicator", "org1", "phishing indicator")
        .await
        .unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(err.step(), Step::StoreKey);
    assert_eq!(err.class(), FailureClass::Infrastructure);
    assert!(harness.content.is_empty());
    assert!(harness.ledger.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_stalled_content_store_fails_publish() {
    let harness = TestHarness::new();
    let exchange = common::exchange_over(
        &harness,
        harness.secrets.clone(),
        common::Stalled,
        harness.ledger.clone(),
        common::short_timeout_config(),
    );

    let err = exchange
        .publish("alert.txt", b"indicator", "org1", "phishing indicator")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ExchangeError::ContentUnavailable {
            step: Step::StoreContent,
            ..
        }
    ));
    assert!(err.is_timeout());
    // The key was already escrowed; nothing is rolled back
    assert_eq!(harness.secrets.len(), 1);
    assert!(harness.ledger.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_stalled_ledger_leaves_orphans() {
    let harness = TestHarness::new();
    let exchange = common::exchange_over(
        &harness,
        harness.secrets.clone(),
        harness.content.clone(),
        common::Stalled,
        common::short_timeout_config(),
    );

    let err = exchange
        .publish("alert.txt", b"indicator", "org1", "phishing indicator")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ExchangeError::LedgerFailure {
            step: Step::AnchorRecord,
            ..
        }
    ));
    assert!(err.is_timeout());
    assert_eq!(harness.secrets.len(), 1);
    assert_eq!(harness.content.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_stalled_content_store_fails_retrieve() {
    let harness = TestHarness::new();
    let published = harness
        .exchange()
        .publish("alert.txt", b"indicator", "org1", "phishing indicator")
        .await
        .unwrap();

    let consumer = common::exchange_over(
        &harness,
        harness.secrets.clone(),
        common::Stalled,
        harness.ledger.clone(),
        common::short_timeout_config(),
    );
    let err = consumer.retrieve(published.uuid).await.unwrap_err();
    assert_eq!(err.step(), Step::FetchContent);
    assert!(err.is_timeout());
}

#[tokio::test(start_paused = true)]
async fn test_stalled_secret_store_fails_retrieve() {
    let harness = TestHarness::new();
    let published = harness
        .exchange()
        .publish("alert.txt", b"indicator", "org1", "phishing indicator")
        .await
        .unwrap();

    let consumer = common::exchange_over(
        &harness,
        common::Stalled,
        harness.content.clone(),
        harness.ledger.clone(),
        common::short_timeout_config(),
    );
    let err = consumer.retrieve(published.uuid).await.unwrap_err();
    assert_eq!(err.step(), Step::FetchKey);
    assert!(err.is_timeout());
}
