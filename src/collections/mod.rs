//! Typed collections of server-managed resources.
//!
//! Every resource kind has one collection per context, published through
//! the context's entity handles. [`EntityCollection`] carries the operations
//! shared by all kinds; specialized collections add kind-specific creation
//! helpers and dereference to their generic view.

mod access_policies;
mod assets;
mod locators;
mod storage_accounts;

pub use access_policies::AccessPolicyCollection;
pub use assets::AssetCollection;
pub use locators::LocatorCollection;
pub use storage_accounts::StorageAccountCollection;

use serde_json::{Map, Value};

use crate::context::{MediaContext, WeakContext};
use crate::error::{Error, Result};
use crate::save::LinkReference;
use crate::service::Query;
use crate::types::{EntityKind, RemoteEntity};

/// Collection of one resource kind.
///
/// Reads run under the context's query retry policy and return a fresh
/// snapshot each time; filtering with [`find`](Self::find) happens in memory
/// over that snapshot. Returned entities are bound to the context.
#[derive(Clone)]
pub struct EntityCollection {
    kind: EntityKind,
    context: WeakContext,
}

impl EntityCollection {
    pub(crate) fn new(kind: EntityKind, context: WeakContext) -> Self {
        Self { kind, context }
    }

    /// Returns the resource kind listed by this collection.
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub(crate) fn context(&self) -> Result<MediaContext> {
        self.context
            .upgrade()
            .ok_or_else(|| Error::invalid_state("media context has been dropped"))
    }

    /// Lists every entity of this kind.
    #[tracing::instrument(skip(self), fields(kind = %self.kind))]
    pub async fn list(&self) -> Result<Vec<RemoteEntity>> {
        self.context()?.query(&Query::all(self.kind)).await
    }

    /// Fetches one entity by identity.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the service returned nothing for `id`.
    #[tracing::instrument(skip(self), fields(kind = %self.kind))]
    pub async fn get(&self, id: &str) -> Result<RemoteEntity> {
        self.context()?
            .query(&Query::by_id(self.kind, id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found(format!("{}('{}') does not exist", self.kind, id)))
    }

    /// Returns the entities of a fresh listing that match `predicate`.
    pub async fn find<P>(&self, predicate: P) -> Result<Vec<RemoteEntity>>
    where
        P: Fn(&RemoteEntity) -> bool,
    {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|entity| predicate(entity))
            .collect())
    }

    /// Returns the first entity of a fresh listing that matches `predicate`.
    pub async fn first_where<P>(&self, predicate: P) -> Result<Option<RemoteEntity>>
    where
        P: Fn(&RemoteEntity) -> bool,
    {
        Ok(self.list().await?.into_iter().find(|entity| predicate(entity)))
    }

    /// Creates an entity with no links.
    pub async fn create(&self, fields: Map<String, Value>) -> Result<RemoteEntity> {
        self.create_linked(fields, &[]).await
    }

    /// Creates an entity linked to existing entities.
    pub async fn create_linked(
        &self,
        fields: Map<String, Value>,
        references: &[LinkReference],
    ) -> Result<RemoteEntity> {
        self.context()?
            .create_linked(self.kind, fields, references)
            .await
    }
}

impl std::fmt::Debug for EntityCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityCollection")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Builds an attribute map from `(name, value)` pairs.
pub(crate) fn fields<const N: usize>(pairs: [(&str, Value); N]) -> Map<String, Value> {
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}
