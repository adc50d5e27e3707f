//! Linked saves end to end: validation, commit, links and cache invalidation.

use std::error::Error as _;

use cloudmedia::retry::find_cause;
use cloudmedia::{
    CancellationToken, EntityKind, ErrorKind, LinkReference, LinkedSaveWorkflow, LocatorType,
    RemoteEntity,
};
use serde_json::{Map, json};

use crate::common::TestFixture;

#[tokio::test]
async fn test_sas_locator_created_and_linked() {
    let fixture = TestFixture::create();
    let asset = fixture.bound_asset().await;
    asset.related("Locators").await.expect("prime cache");

    let locator = fixture
        .context
        .locators()
        .create_sas_locator(&asset, &fixture.policy, None)
        .await
        .expect("locator");

    let id = locator.id().expect("identity assigned");
    assert_eq!(locator.kind(), EntityKind::Locator);
    assert!(locator.attribute("Created").is_some());
    assert!(locator.link("Asset").is_some_and(|a| a.same_entity(&asset)));
    assert!(
        locator
            .link("AccessPolicy")
            .is_some_and(|p| p.same_entity(&fixture.policy))
    );
    assert!(locator.context().is_some());

    let mut links = fixture.service.links_of(EntityKind::Locator, &id);
    links.sort();
    assert_eq!(
        links,
        vec![
            ("AccessPolicy".to_string(), EntityKind::AccessPolicy, fixture.policy.id().expect("id")),
            ("Asset".to_string(), EntityKind::Asset, asset.id().expect("id")),
        ]
    );
    assert!(!asset.is_related_cached("Locators"));
    assert_eq!(fixture.service.save_calls(), 1);
}

#[tokio::test]
async fn test_wrong_target_kind_sends_nothing() {
    let fixture = TestFixture::create();

    let err = fixture
        .context
        .locators()
        .create_sas_locator(&fixture.policy, &fixture.asset, None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(err.message().contains("AccessPolicy"));
    assert_eq!(fixture.service.save_calls(), 0);
    assert_eq!(fixture.service.entity_count(EntityKind::Locator), 0);
}

#[tokio::test]
async fn test_uncommitted_target_sends_nothing() {
    let fixture = TestFixture::create();
    let draft = RemoteEntity::new(EntityKind::Asset, Map::new());

    let err = fixture
        .context
        .locators()
        .create_sas_locator(&draft, &fixture.policy, None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(err.message().contains("Asset"));
    assert_eq!(fixture.service.save_calls(), 0);
}

#[tokio::test]
async fn test_duplicate_relation_rejected() {
    let fixture = TestFixture::create();
    let other = fixture.service.seed(EntityKind::Asset, json!({ "Name": "other" }));

    let err = fixture
        .context
        .create_linked(
            EntityKind::Locator,
            Map::new(),
            &[
                LinkReference::new("Asset", &fixture.asset),
                LinkReference::new("Asset", &other),
            ],
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(fixture.service.save_calls(), 0);
}

#[tokio::test]
async fn test_empty_references_create_plain_entity() {
    let fixture = TestFixture::create();

    let job = fixture
        .context
        .create_linked(EntityKind::Job, Map::new(), &[])
        .await
        .expect("job");

    assert!(job.has_identity());
    assert_eq!(fixture.service.entity_count(EntityKind::Job), 1);
}

#[tokio::test]
async fn test_permanent_failure_leaves_caches_alone() {
    let fixture = TestFixture::create();
    let asset = fixture.bound_asset().await;
    asset.related("Locators").await.expect("prime cache");
    fixture.service.fail_next_saves(409, 1);

    let err = fixture
        .context
        .locators()
        .create_sas_locator(&asset, &fixture.policy, None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PermanentRemote);
    let cause = find_cause(&err, ErrorKind::SaveExecution).expect("save failure kept");
    assert_eq!(cause.status_code(), Some(409));
    assert!(err.source().is_some());

    assert!(asset.is_related_cached("Locators"));
    assert_eq!(fixture.service.save_calls(), 1);
    assert_eq!(fixture.service.entity_count(EntityKind::Locator), 0);
}

#[tokio::test]
async fn test_lost_response_is_not_applied_twice() {
    let fixture = TestFixture::create();
    fixture.service.lose_next_save_responses(1);

    let locator = fixture
        .context
        .locators()
        .create_locator(LocatorType::Sas, &fixture.asset, &fixture.policy, None)
        .await
        .expect("locator after retry");

    assert!(locator.has_identity());
    assert_eq!(fixture.service.save_calls(), 2);
    assert_eq!(fixture.service.entity_count(EntityKind::Locator), 1);

    let batches = fixture.service.recorded_batches();
    assert_eq!(batches[0].batch_id, batches[1].batch_id);
}

#[tokio::test]
async fn test_cancelled_before_commit_sends_nothing() {
    let fixture = TestFixture::create();
    let token = CancellationToken::new();
    token.cancel();

    let err = fixture
        .context
        .create_linked_with_cancel(
            EntityKind::Locator,
            Map::new(),
            &[
                LinkReference::new("AccessPolicy", &fixture.policy),
                LinkReference::new("Asset", &fixture.asset),
            ],
            &token,
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert_eq!(fixture.service.save_calls(), 0);
}

#[tokio::test]
async fn test_workflow_with_custom_policy() {
    let fixture = TestFixture::create();
    fixture.service.fail_next_saves(503, 1);
    let policy = cloudmedia::RetryPolicy::for_saves(cloudmedia::RetryConfig::disabled());

    let err = LinkedSaveWorkflow::new(&fixture.context)
        .with_policy(policy)
        .create_linked(
            EntityKind::Locator,
            Map::new(),
            &[LinkReference::new("Asset", &fixture.asset)],
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RetryExhausted);
    assert_eq!(fixture.service.save_calls(), 1);
}

#[cfg(feature = "blocking")]
#[test]
fn test_blocking_locator_creation() {
    let fixture = TestFixture::create();

    let locator = fixture
        .context
        .locators()
        .create_sas_locator_blocking(&fixture.asset, &fixture.policy, None)
        .expect("locator");
    assert!(locator.has_identity());

    fixture.service.fail_next_saves(400, 1);
    let err = fixture
        .context
        .create_linked_blocking(EntityKind::Job, Map::new(), &[])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermanentRemote);
}
