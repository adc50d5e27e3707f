//! The transport-backed executors driven through a context.

use cloudmedia::service::SaveOperation;
use cloudmedia::transport::{Method, ServiceVersion};
use cloudmedia::{EntityKind, ErrorKind, RemoteEntity, RetryConfig};
use serde_json::{Map, json};

use crate::common::{fast_retries, mock_context};

fn existing(kind: EntityKind, id: &str) -> RemoteEntity {
    RemoteEntity::with_id(kind, id, Map::new())
}

#[tokio::test]
async fn test_list_issues_versioned_get() {
    let (transport, context) = mock_context(fast_retries(2));
    transport.push_response(json!({ "value": [
        { "Id": "nb:cid:1", "Name": "movie" },
        { "Id": "nb:cid:2", "Name": "trailer" },
    ] }));

    let assets = context.assets().list().await.expect("assets");
    assert_eq!(assets.len(), 2);
    assert_eq!(assets[1].attribute("Name"), Some(json!("trailer")));

    let request = &transport.requests()[0];
    assert_eq!(request.method, Method::Get);
    assert_eq!(request.url.as_str(), "https://media.example.net/api/Assets");
    assert_eq!(request.header(ServiceVersion::HEADER), Some(ServiceVersion::CURRENT));
}

#[tokio::test]
async fn test_derived_collection_path() {
    let (transport, context) = mock_context(fast_retries(2));
    transport.push_response(json!({ "Id": "nb:cid:1" }));
    transport.push_response(json!({ "value": [{ "Id": "nb:lid:9", "Type": 1 }] }));

    let asset = context.assets().get("nb:cid:1").await.expect("asset");
    let locators = asset.related("Locators").await.expect("locators");

    assert_eq!(locators[0].kind(), EntityKind::Locator);
    let urls: Vec<String> = transport
        .requests()
        .iter()
        .map(|r| r.url.to_string())
        .collect();
    assert_eq!(
        urls,
        [
            "https://media.example.net/api/Assets('nb%3Acid%3A1')",
            "https://media.example.net/api/Assets('nb%3Acid%3A1')/Locators",
        ]
    );
}

#[tokio::test]
async fn test_locator_batch_shape() {
    let (transport, context) = mock_context(fast_retries(2));
    transport.push_response(json!({ "results": [{ "content_id": 1, "id": "nb:lid:1" }] }));

    let asset = existing(EntityKind::Asset, "nb:cid:1");
    let policy = existing(EntityKind::AccessPolicy, "nb:pid:1");
    let locator = context
        .locators()
        .create_sas_locator(&asset, &policy, None)
        .await
        .expect("locator");
    assert_eq!(locator.id().as_deref(), Some("nb:lid:1"));

    let request = &transport.requests()[0];
    assert_eq!(request.method, Method::Post);
    let body = request.body.clone().expect("body");
    let batch: cloudmedia::service::SaveBatch = serde_json::from_value(body).expect("batch");
    let shape: Vec<&str> = batch
        .operations
        .iter()
        .map(|op| match op {
            SaveOperation::Attach { .. } => "attach",
            SaveOperation::Add { .. } => "add",
            SaveOperation::SetLink { .. } => "link",
        })
        .collect();
    assert_eq!(shape, ["attach", "attach", "add", "link", "link"]);
}

#[tokio::test]
async fn test_transport_status_drives_retry() {
    let (transport, context) = mock_context(fast_retries(3));
    transport.push_failure(502, "bad gateway");
    transport.push_response(json!({ "results": [{ "content_id": 1, "id": "nb:jid:1" }] }));

    let job = context
        .jobs()
        .create(Map::new())
        .await
        .expect("job after retry");
    assert_eq!(job.id().as_deref(), Some("nb:jid:1"));

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].body, requests[1].body);
}

#[tokio::test]
async fn test_transport_rejection_is_permanent() {
    let (transport, context) = mock_context(RetryConfig::default());
    transport.push_failure(400, "bad request");

    let err = context.jobs().create(Map::new()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermanentRemote);
    assert_eq!(transport.request_count(), 1);

    let cause = cloudmedia::retry::find_cause(&err, ErrorKind::SaveExecution).expect("cause");
    assert_eq!(cause.status_code(), Some(400));
}

#[tokio::test]
async fn test_missing_result_is_invalid_response() {
    let (transport, context) = mock_context(fast_retries(2));
    transport.push_response(json!({ "results": [] }));

    let err = context.jobs().create(Map::new()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidResponse);
}
