//! Internal context state.

use std::sync::Arc;

use url::Url;

use super::{EntityHandle, MediaContext};
use crate::collections::{
    AccessPolicyCollection, AssetCollection, EntityCollection, LocatorCollection,
    StorageAccountCollection,
};
use crate::config::{RetryConfig, TransferConfig};
use crate::retry::RetryPolicy;
use crate::service::{DefaultServiceFactory, ServiceFactory};
use crate::transport::{Transport, VersionAdapter};
use crate::types::EntityKind;

pub(crate) struct ContextInner {
    /// Service root every request path is joined to.
    pub api_server: Url,

    /// Authenticated transport shared by every executor.
    pub transport: Arc<dyn Transport>,

    /// Protocol version header.
    pub version: Arc<dyn VersionAdapter>,

    pub retry_config: RetryConfig,
    pub transfer_config: TransferConfig,

    /// Policies derived from `retry_config`.
    pub query_policy: RetryPolicy,
    pub save_policy: RetryPolicy,

    pub service_factory: EntityHandle<Arc<dyn ServiceFactory>>,
    pub collections: CollectionHandles,
}

/// One handle per resource kind.
pub(crate) struct CollectionHandles {
    pub assets: EntityHandle<AssetCollection>,
    pub files: EntityHandle<EntityCollection>,
    pub access_policies: EntityHandle<AccessPolicyCollection>,
    pub content_keys: EntityHandle<EntityCollection>,
    pub jobs: EntityHandle<EntityCollection>,
    pub job_templates: EntityHandle<EntityCollection>,
    pub notification_end_points: EntityHandle<EntityCollection>,
    pub media_processors: EntityHandle<EntityCollection>,
    pub locators: EntityHandle<LocatorCollection>,
    pub ingest_manifests: EntityHandle<EntityCollection>,
    pub ingest_manifest_assets: EntityHandle<EntityCollection>,
    pub ingest_manifest_files: EntityHandle<EntityCollection>,
    pub storage_accounts: EntityHandle<StorageAccountCollection>,
}

impl CollectionHandles {
    fn new() -> Self {
        Self {
            assets: EntityHandle::new(|ctx| AssetCollection::new(ctx.downgrade())),
            files: EntityHandle::new(|ctx| EntityCollection::new(EntityKind::AssetFile, ctx.downgrade())),
            access_policies: EntityHandle::new(|ctx| AccessPolicyCollection::new(ctx.downgrade())),
            content_keys: EntityHandle::new(|ctx| {
                EntityCollection::new(EntityKind::ContentKey, ctx.downgrade())
            }),
            jobs: EntityHandle::new(|ctx| EntityCollection::new(EntityKind::Job, ctx.downgrade())),
            job_templates: EntityHandle::new(|ctx| {
                EntityCollection::new(EntityKind::JobTemplate, ctx.downgrade())
            }),
            notification_end_points: EntityHandle::new(|ctx| {
                EntityCollection::new(EntityKind::NotificationEndPoint, ctx.downgrade())
            }),
            media_processors: EntityHandle::new(|ctx| {
                EntityCollection::new(EntityKind::MediaProcessor, ctx.downgrade())
            }),
            locators: EntityHandle::new(|ctx| LocatorCollection::new(ctx.downgrade())),
            ingest_manifests: EntityHandle::new(|ctx| {
                EntityCollection::new(EntityKind::IngestManifest, ctx.downgrade())
            }),
            ingest_manifest_assets: EntityHandle::new(|ctx| {
                EntityCollection::new(EntityKind::IngestManifestAsset, ctx.downgrade())
            }),
            ingest_manifest_files: EntityHandle::new(|ctx| {
                EntityCollection::new(EntityKind::IngestManifestFile, ctx.downgrade())
            }),
            storage_accounts: EntityHandle::new(|ctx| StorageAccountCollection::new(ctx.downgrade())),
        }
    }

    /// Number of collections published so far.
    pub fn initialized_count(&self) -> usize {
        [
            self.assets.is_initialized(),
            self.files.is_initialized(),
            self.access_policies.is_initialized(),
            self.content_keys.is_initialized(),
            self.jobs.is_initialized(),
            self.job_templates.is_initialized(),
            self.notification_end_points.is_initialized(),
            self.media_processors.is_initialized(),
            self.locators.is_initialized(),
            self.ingest_manifests.is_initialized(),
            self.ingest_manifest_assets.is_initialized(),
            self.ingest_manifest_files.is_initialized(),
            self.storage_accounts.is_initialized(),
        ]
        .into_iter()
        .filter(|initialized| *initialized)
        .count()
    }
}

fn default_service_factory(ctx: &MediaContext) -> Arc<dyn ServiceFactory> {
    Arc::new(DefaultServiceFactory::new(
        ctx.api_server().clone(),
        ctx.transport(),
        ctx.version_adapter(),
    ))
}

impl ContextInner {
    pub fn new(
        api_server: Url,
        transport: Arc<dyn Transport>,
        version: Arc<dyn VersionAdapter>,
        retry_config: RetryConfig,
        transfer_config: TransferConfig,
        service_factory: Option<Arc<dyn ServiceFactory>>,
    ) -> Self {
        let service_factory = match service_factory {
            Some(factory) => EntityHandle::published(factory, default_service_factory),
            None => EntityHandle::new(default_service_factory),
        };

        Self {
            api_server,
            transport,
            version,
            query_policy: RetryPolicy::for_queries(retry_config.clone()),
            save_policy: RetryPolicy::for_saves(retry_config.clone()),
            retry_config,
            transfer_config,
            service_factory,
            collections: CollectionHandles::new(),
        }
    }
}
