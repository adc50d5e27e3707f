//! Context composition, lazy collections and derived collection caching.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use cloudmedia::service::{
    Query, QueryExecutor, QueryScope, SaveExecutor, ServiceFactory,
};
use cloudmedia::testing::InMemoryService;
use cloudmedia::transport::MockTransport;
use cloudmedia::{EntityKind, EntityRecord, ErrorKind, LocatorType, MediaContext, Result};
use serde_json::json;
use tokio::sync::Semaphore;

use crate::common::{TestFixture, fast_retries};

/// Holds the first derived-collection read after it has taken its snapshot,
/// until the test releases it.
struct HeldNavigation {
    service: InMemoryService,
    armed: AtomicBool,
    snapshot_taken: Semaphore,
    release: Semaphore,
}

#[async_trait]
impl QueryExecutor for HeldNavigation {
    async fn execute(&self, query: &Query) -> Result<Vec<EntityRecord>> {
        let snapshot = self.service.execute(query).await;
        let is_navigation = matches!(query.scope(), QueryScope::Navigation { .. });
        if is_navigation && self.armed.swap(false, Ordering::SeqCst) {
            self.snapshot_taken.add_permits(1);
            self.release.acquire().await.expect("release gate").forget();
        }
        snapshot
    }
}

struct HeldFactory(Arc<HeldNavigation>);

impl ServiceFactory for HeldFactory {
    fn query_executor(&self) -> Arc<dyn QueryExecutor> {
        self.0.clone()
    }

    fn save_executor(&self) -> Arc<dyn SaveExecutor> {
        Arc::new(self.0.service.clone())
    }
}

/// Concurrent first access from many threads publishes one collection.
#[test]
fn test_collection_published_once_across_threads() {
    let fixture = TestFixture::create();
    let context = Arc::new(fixture.context.clone());
    let barrier = Arc::new(std::sync::Barrier::new(8));

    let addresses: Vec<usize> = (0..8)
        .map(|_| {
            let context = Arc::clone(&context);
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                context.locators() as *const _ as usize
            })
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|handle| handle.join().expect("thread"))
        .collect();

    assert!(addresses.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(context.initialized_collections(), 1);
}

/// Clones of a context share collections; tasks see the same instance.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_collection_shared_across_tasks() {
    let fixture = TestFixture::create();

    let tasks = (0..16).map(|_| {
        let context = fixture.context.clone();
        tokio::spawn(async move { context.assets() as *const _ as usize })
    });
    let addresses: Vec<usize> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.expect("task"))
        .collect();

    assert!(addresses.windows(2).all(|pair| pair[0] == pair[1]));
    assert!(std::ptr::eq(
        fixture.context.assets(),
        fixture.context.clone().assets()
    ));
}

#[tokio::test]
async fn test_default_account_follows_current_snapshot() {
    let service = InMemoryService::new();
    service.seed(EntityKind::StorageAccount, json!({ "Name": "archive", "IsDefault": false }));
    let context = service.context().expect("context");

    assert!(context.default_storage_account().await.expect("query").is_none());

    service.seed(EntityKind::StorageAccount, json!({ "Name": "primary", "IsDefault": true }));
    let account = context
        .default_storage_account()
        .await
        .expect("query")
        .expect("default account");
    assert_eq!(account.attribute("Name"), Some(json!("primary")));
    assert_eq!(service.query_calls(), 2);
}

#[tokio::test]
async fn test_derived_collection_cached_until_linked_save() {
    let fixture = TestFixture::create();
    let asset = fixture.bound_asset().await;

    let before = asset.related("Locators").await.expect("locators");
    assert!(before.is_empty());
    assert!(asset.is_related_cached("Locators"));

    let calls = fixture.service.query_calls();
    asset.related("Locators").await.expect("cached");
    assert_eq!(fixture.service.query_calls(), calls);

    let locator = fixture
        .context
        .locators()
        .create_locator(LocatorType::OnDemandOrigin, &asset, &fixture.policy, None)
        .await
        .expect("locator");
    assert!(!asset.is_related_cached("Locators"));

    let after = asset.related("Locators").await.expect("refetched");
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].id(), locator.id());
    assert_eq!(after[0].attribute("Type"), Some(json!(2)));
}

#[tokio::test]
async fn test_unbound_entity_cannot_fetch_derived_collection() {
    let fixture = TestFixture::create();
    // The seeded handle was never fetched through a context.
    let err = fixture.asset.related("Locators").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

#[tokio::test]
async fn test_entities_outliving_context() {
    let fixture = TestFixture::create();
    let asset = fixture.bound_asset().await;
    let TestFixture { context, .. } = fixture;
    drop(context);

    assert!(asset.context().is_none());
    let err = asset.related("Locators").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

/// A derived-collection read that started before a linked save must not
/// write its pre-commit snapshot back over the invalidation.
#[tokio::test]
async fn test_in_flight_read_does_not_recache_after_linked_save() {
    let service = InMemoryService::new();
    let seeded = service.seed(EntityKind::Asset, json!({ "Name": "movie.mp4" }));
    let policy = service.seed(EntityKind::AccessPolicy, json!({ "Name": "read-1h" }));
    let held = Arc::new(HeldNavigation {
        service: service.clone(),
        armed: AtomicBool::new(true),
        snapshot_taken: Semaphore::new(0),
        release: Semaphore::new(0),
    });
    let context = MediaContext::builder()
        .transport(Arc::new(MockTransport::new()))
        .retry_config(fast_retries(3))
        .service_factory(Arc::new(HeldFactory(held.clone())))
        .build()
        .expect("context");

    let id = seeded.id().expect("seeded id");
    let asset = context.assets().get(&id).await.expect("asset");

    let read = asset.related("Locators");
    let save = async {
        held.snapshot_taken.acquire().await.expect("snapshot gate").forget();
        let locator = context
            .locators()
            .create_sas_locator(&asset, &policy, None)
            .await;
        held.release.add_permits(1);
        locator
    };
    let (stale, locator) = tokio::join!(read, save);

    assert!(stale.expect("in-flight read").is_empty());
    let locator = locator.expect("locator");
    assert!(!asset.is_related_cached("Locators"));

    let fresh = asset.related("Locators").await.expect("refetched");
    assert_eq!(fresh.len(), 1);
    assert_eq!(fresh[0].id(), locator.id());
}
