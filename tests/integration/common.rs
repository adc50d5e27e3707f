//! Common test harness for cloudmedia integration tests.

use std::sync::{Arc, Once};
use std::time::Duration;

use cloudmedia::testing::InMemoryService;
use cloudmedia::transport::MockTransport;
use cloudmedia::{EntityKind, MediaContext, RemoteEntity, RetryConfig};
use serde_json::json;

static TRACING: Once = Once::new();

/// Installs a test subscriber honoring `RUST_LOG`, once per process.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Retry settings that keep tests fast: `attempts` total, 1 ms apart.
pub fn fast_retries(attempts: u32) -> RetryConfig {
    RetryConfig::new()
        .with_max_attempts(attempts)
        .with_initial_delay(Duration::from_millis(1))
        .with_max_delay(Duration::from_millis(5))
        .with_jitter(0.0)
}

/// A service seeded with one asset and one read policy, plus a context
/// served by it.
pub struct TestFixture {
    pub service: InMemoryService,
    pub context: MediaContext,
    pub asset: RemoteEntity,
    pub policy: RemoteEntity,
}

impl TestFixture {
    pub fn create() -> Self {
        Self::with_retries(fast_retries(4))
    }

    pub fn with_retries(config: RetryConfig) -> Self {
        init_tracing();
        let service = InMemoryService::new();
        let asset = service.seed(EntityKind::Asset, json!({ "Name": "movie.mp4" }));
        let policy = service.seed(
            EntityKind::AccessPolicy,
            json!({ "Name": "read-1h", "DurationInMinutes": 60.0, "Permissions": 1 }),
        );
        let context = service.context_with(config).expect("context");

        Self {
            service,
            context,
            asset,
            policy,
        }
    }

    /// Fetches the seeded asset through the context so it is bound to it.
    pub async fn bound_asset(&self) -> RemoteEntity {
        let id = self.asset.id().expect("seeded asset has id");
        self.context.assets().get(&id).await.expect("asset exists")
    }
}

/// A context talking to a scripted transport through the default executors.
pub fn mock_context(config: RetryConfig) -> (Arc<MockTransport>, MediaContext) {
    init_tracing();
    let transport = Arc::new(MockTransport::new());
    let context = MediaContext::builder()
        .url("https://media.example.net/api/")
        .transport(transport.clone())
        .retry_config(config)
        .build()
        .expect("valid context");
    (transport, context)
}
