//! Retry behavior of queries and commits against scripted failures.

use std::time::{Duration, Instant};

use cloudmedia::retry::find_cause;
use cloudmedia::{CancellationToken, EntityKind, ErrorKind, LinkReference, RetryConfig};
use serde_json::Map;

use crate::common::{TestFixture, fast_retries};

#[tokio::test]
async fn test_transient_commit_failures_are_retried() {
    let fixture = TestFixture::with_retries(fast_retries(4));
    fixture.service.fail_next_saves(503, 2);

    let locator = fixture
        .context
        .locators()
        .create_sas_locator(&fixture.asset, &fixture.policy, None)
        .await
        .expect("locator");

    assert!(locator.has_identity());
    assert_eq!(fixture.service.save_calls(), 3);
    assert_eq!(fixture.service.entity_count(EntityKind::Locator), 1);
}

#[tokio::test]
async fn test_budget_exhaustion_keeps_last_failure() {
    let fixture = TestFixture::with_retries(fast_retries(3));
    fixture.service.fail_next_saves(429, 10);

    let err = fixture
        .context
        .locators()
        .create_sas_locator(&fixture.asset, &fixture.policy, None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RetryExhausted);
    assert_eq!(fixture.service.save_calls(), 3);
    let cause = find_cause(&err, ErrorKind::SaveExecution).expect("cause");
    assert_eq!(cause.status_code(), Some(429));
    assert!(find_cause(&err, ErrorKind::Transport).is_some());
}

#[tokio::test]
async fn test_query_retried_on_throttling() {
    let fixture = TestFixture::create();
    fixture.service.fail_next_queries(429, 1);

    let assets = fixture.context.assets().list().await.expect("assets");
    assert_eq!(assets.len(), 1);
    assert_eq!(fixture.service.query_calls(), 2);
}

#[tokio::test]
async fn test_query_not_retried_on_client_error() {
    let fixture = TestFixture::create();
    fixture.service.fail_next_queries(404, 1);

    let err = fixture.context.jobs().list().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermanentRemote);
    assert_eq!(fixture.service.query_calls(), 1);
}

#[tokio::test]
async fn test_cancel_during_backoff() {
    let fixture = TestFixture::with_retries(
        RetryConfig::new()
            .with_max_attempts(5)
            .with_initial_delay(Duration::from_secs(60))
            .with_jitter(0.0),
    );
    fixture.service.fail_next_saves(503, 5);
    let token = CancellationToken::new();
    let references = [
        LinkReference::new("AccessPolicy", &fixture.policy),
        LinkReference::new("Asset", &fixture.asset),
    ];
    let started = Instant::now();

    let create = fixture.context.create_linked_with_cancel(
        EntityKind::Locator,
        Map::new(),
        &references,
        &token,
    );
    let canceller = async {
        while fixture.service.save_calls() == 0 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        token.cancel();
    };
    let (result, ()) = tokio::join!(create, canceller);

    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert!(find_cause(&err, ErrorKind::SaveExecution).is_some());
    assert_eq!(fixture.service.save_calls(), 1);
    assert!(started.elapsed() < Duration::from_secs(30));
}
