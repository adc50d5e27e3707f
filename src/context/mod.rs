//! The media context: composition root for collections and executors.
//!
//! A [`MediaContext`] owns one [`EntityHandle`] per resource kind plus the
//! transport and version adapter shared by everything it creates.
//! Collections are built on first access and then live as long as the
//! context.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cloudmedia::prelude::*;
//!
//! let context = MediaContext::builder()
//!     .transport(Arc::new(HttpTransport::new(token_source)))
//!     .build()?;
//!
//! let asset = context.assets().create_asset("movie", AssetOptions::None).await?;
//! let policy = context
//!     .access_policies()
//!     .create_policy("read-1h", Duration::from_secs(3600), AccessPermissions::READ)
//!     .await?;
//! let locator = context.locators().create_sas_locator(&asset, &policy, None).await?;
//! ```

mod builder;
mod handle;
mod inner;

pub use builder::{ContextBuilder, DEFAULT_API_SERVER, HasTransport, NoTransport};
pub use handle::EntityHandle;

use std::ops::Deref;
use std::sync::{Arc, Weak};

use serde_json::{Map, Value};
use url::Url;

use crate::collections::{
    AccessPolicyCollection, AssetCollection, EntityCollection, LocatorCollection,
    StorageAccountCollection,
};
use crate::config::{RetryConfig, TransferConfig};
use crate::error::Result;
use crate::retry::{CancellationToken, RetryPolicy};
use crate::save::{LinkReference, LinkedSaveWorkflow};
use crate::service::{Query, ServiceFactory};
use crate::transport::{Transport, VersionAdapter};
use crate::types::{EntityKind, RemoteEntity};

/// Session with the media service.
///
/// ## Thread Safety
///
/// `MediaContext` is `Clone` and thread-safe; clones share every collection
/// and adapter. Collections and entities refer back to the context weakly,
/// so dropping the last `MediaContext` releases everything.
///
/// ## Example
///
/// ```rust
/// use std::sync::Arc;
/// use cloudmedia::MediaContext;
/// use cloudmedia::transport::MockTransport;
///
/// let context = MediaContext::builder()
///     .transport(Arc::new(MockTransport::new()))
///     .build()?;
///
/// let first = context.locators();
/// let second = context.clone();
/// assert!(std::ptr::eq(first, second.locators()));
/// # Ok::<(), cloudmedia::Error>(())
/// ```
#[derive(Clone)]
pub struct MediaContext {
    inner: Arc<inner::ContextInner>,
}

/// Non-owning reference to a [`MediaContext`].
#[derive(Clone)]
pub struct WeakContext {
    inner: Weak<inner::ContextInner>,
}

impl WeakContext {
    /// Returns the context if it is still alive.
    pub fn upgrade(&self) -> Option<MediaContext> {
        self.inner.upgrade().map(|inner| MediaContext { inner })
    }
}

impl std::fmt::Debug for WeakContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakContext")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl MediaContext {
    /// Creates a new context builder.
    pub fn builder() -> ContextBuilder<NoTransport> {
        ContextBuilder::new()
    }

    pub(crate) fn from_inner(inner: inner::ContextInner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Returns a non-owning reference to this context.
    pub fn downgrade(&self) -> WeakContext {
        WeakContext {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Returns the service root.
    pub fn api_server(&self) -> &Url {
        &self.inner.api_server
    }

    /// Returns the shared transport.
    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.inner.transport)
    }

    /// Returns the shared version adapter.
    pub fn version_adapter(&self) -> Arc<dyn VersionAdapter> {
        Arc::clone(&self.inner.version)
    }

    /// Returns the retry configuration.
    pub fn retry_config(&self) -> &RetryConfig {
        &self.inner.retry_config
    }

    /// Returns the content transfer limits.
    pub fn transfer_config(&self) -> &TransferConfig {
        &self.inner.transfer_config
    }

    /// Returns the factory producing query and save executors.
    pub fn service_factory(&self) -> &Arc<dyn ServiceFactory> {
        self.inner.service_factory.get(self)
    }

    pub(crate) fn query_policy(&self) -> &RetryPolicy {
        &self.inner.query_policy
    }

    pub(crate) fn save_policy(&self) -> &RetryPolicy {
        &self.inner.save_policy
    }

    /// Number of collections built so far.
    pub fn initialized_collections(&self) -> usize {
        self.inner.collections.initialized_count()
    }

    /// Assets.
    pub fn assets(&self) -> &AssetCollection {
        self.inner.collections.assets.get(self)
    }

    /// Files belonging to assets.
    pub fn files(&self) -> &EntityCollection {
        self.inner.collections.files.get(self)
    }

    /// Access policies.
    pub fn access_policies(&self) -> &AccessPolicyCollection {
        self.inner.collections.access_policies.get(self)
    }

    /// Content keys.
    pub fn content_keys(&self) -> &EntityCollection {
        self.inner.collections.content_keys.get(self)
    }

    /// Jobs.
    pub fn jobs(&self) -> &EntityCollection {
        self.inner.collections.jobs.get(self)
    }

    /// Job templates.
    pub fn job_templates(&self) -> &EntityCollection {
        self.inner.collections.job_templates.get(self)
    }

    /// Notification endpoints.
    pub fn notification_end_points(&self) -> &EntityCollection {
        self.inner.collections.notification_end_points.get(self)
    }

    /// Media processors.
    pub fn media_processors(&self) -> &EntityCollection {
        self.inner.collections.media_processors.get(self)
    }

    /// Locators.
    pub fn locators(&self) -> &LocatorCollection {
        self.inner.collections.locators.get(self)
    }

    /// Ingest manifests.
    pub fn ingest_manifests(&self) -> &EntityCollection {
        self.inner.collections.ingest_manifests.get(self)
    }

    /// Assets of ingest manifests.
    pub fn ingest_manifest_assets(&self) -> &EntityCollection {
        self.inner.collections.ingest_manifest_assets.get(self)
    }

    /// Files of ingest manifest assets.
    pub fn ingest_manifest_files(&self) -> &EntityCollection {
        self.inner.collections.ingest_manifest_files.get(self)
    }

    /// Storage accounts.
    pub fn storage_accounts(&self) -> &StorageAccountCollection {
        self.inner.collections.storage_accounts.get(self)
    }

    /// Returns the generic collection for any kind.
    ///
    /// Specialized collections are returned through their generic view.
    pub fn collection(&self, kind: EntityKind) -> &EntityCollection {
        match kind {
            EntityKind::Asset => self.assets().deref(),
            EntityKind::AssetFile => self.files(),
            EntityKind::AccessPolicy => self.access_policies().deref(),
            EntityKind::ContentKey => self.content_keys(),
            EntityKind::Job => self.jobs(),
            EntityKind::JobTemplate => self.job_templates(),
            EntityKind::NotificationEndPoint => self.notification_end_points(),
            EntityKind::MediaProcessor => self.media_processors(),
            EntityKind::Locator => self.locators().deref(),
            EntityKind::IngestManifest => self.ingest_manifests(),
            EntityKind::IngestManifestAsset => self.ingest_manifest_assets(),
            EntityKind::IngestManifestFile => self.ingest_manifest_files(),
            EntityKind::StorageAccount => self.storage_accounts().deref(),
        }
    }

    /// Returns the storage account flagged as default, if any.
    ///
    /// Recomputed from a fresh listing on every call.
    pub async fn default_storage_account(&self) -> Result<Option<RemoteEntity>> {
        self.storage_accounts().default_account().await
    }

    /// Creates an entity of `kind` linked to existing entities, in one save
    /// transaction.
    ///
    /// See [`LinkedSaveWorkflow`] for preconditions and failure behavior.
    pub async fn create_linked(
        &self,
        kind: EntityKind,
        fields: Map<String, Value>,
        references: &[LinkReference],
    ) -> Result<RemoteEntity> {
        LinkedSaveWorkflow::new(self)
            .create_linked(kind, fields, references)
            .await
    }

    /// Like [`create_linked`](Self::create_linked), but stops retrying once
    /// `token` is cancelled.
    pub async fn create_linked_with_cancel(
        &self,
        kind: EntityKind,
        fields: Map<String, Value>,
        references: &[LinkReference],
        token: &CancellationToken,
    ) -> Result<RemoteEntity> {
        LinkedSaveWorkflow::new(self)
            .with_cancellation(token)
            .create_linked(kind, fields, references)
            .await
    }

    /// Blocking form of [`create_linked`](Self::create_linked).
    ///
    /// Must not be called from inside an async runtime.
    #[cfg(feature = "blocking")]
    #[cfg_attr(docsrs, doc(cfg(feature = "blocking")))]
    pub fn create_linked_blocking(
        &self,
        kind: EntityKind,
        fields: Map<String, Value>,
        references: &[LinkReference],
    ) -> Result<RemoteEntity> {
        crate::blocking::block_on(self.create_linked(kind, fields, references))?
    }

    /// Runs a query under the query retry policy and binds the returned
    /// entities to this context.
    #[tracing::instrument(skip(self), fields(path = %query.path()))]
    pub(crate) async fn query(&self, query: &Query) -> Result<Vec<RemoteEntity>> {
        let executor = self.service_factory().query_executor();
        let records = self
            .query_policy()
            .execute(|| executor.execute(query))
            .await?;

        let context = self.downgrade();
        Ok(records
            .into_iter()
            .map(|record| {
                let entity = RemoteEntity::from_record(query.kind(), record);
                entity.bind(context.clone());
                entity
            })
            .collect())
    }
}

impl std::fmt::Debug for MediaContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaContext")
            .field("api_server", &self.inner.api_server.as_str())
            .field("collections", &self.initialized_collections())
            .finish_non_exhaustive()
    }
}
