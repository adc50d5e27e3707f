//! Server-identified entities shared between callers and collections.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::EntityKind;
use crate::context::{MediaContext, WeakContext};
use crate::error::{Error, Result};
use crate::service::Query;

/// Entity as carried on the wire: identity plus flattened attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Server-assigned identity.
    #[serde(rename = "Id")]
    pub id: String,

    /// Scalar attributes.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// A server-managed resource: asset, access policy, locator, job, ...
///
/// `RemoteEntity` is a shared handle. Clones refer to the same entity, so
/// identity assigned by a commit, links and cached derived collections are
/// visible through every clone. Use [`same_entity`](Self::same_entity) to
/// compare identity.
///
/// An entity created in memory has no identity until a save transaction
/// commits it. Relation slots stay empty until linked.
///
/// ## Example
///
/// ```rust
/// use cloudmedia::types::{EntityKind, RemoteEntity};
/// use serde_json::json;
///
/// let policy = RemoteEntity::with_id(
///     EntityKind::AccessPolicy,
///     "nb:pid:1",
///     json!({ "Name": "read-1h" }).as_object().cloned().unwrap_or_default(),
/// );
/// assert_eq!(policy.id().as_deref(), Some("nb:pid:1"));
/// assert_eq!(policy.attribute("Name"), Some(json!("read-1h")));
/// ```
#[derive(Clone)]
pub struct RemoteEntity {
    inner: Arc<EntityState>,
}

struct EntityState {
    kind: EntityKind,
    id: RwLock<Option<String>>,
    attributes: RwLock<Map<String, Value>>,
    links: RwLock<BTreeMap<String, RemoteEntity>>,
    related: RwLock<RelatedCache>,
    context: RwLock<Option<WeakContext>>,
}

/// Derived collections cached on an entity.
///
/// `generations` counts invalidations per navigation; a fetch only caches its
/// result if no invalidation happened while it was running.
#[derive(Default)]
struct RelatedCache {
    entries: HashMap<String, Vec<RemoteEntity>>,
    generations: HashMap<String, u64>,
}

impl RelatedCache {
    fn generation(&self, navigation: &str) -> u64 {
        self.generations.get(navigation).copied().unwrap_or(0)
    }
}

impl RemoteEntity {
    /// Creates an entity that exists only in memory.
    pub fn new(kind: EntityKind, attributes: Map<String, Value>) -> Self {
        Self::build(kind, None, attributes)
    }

    /// Creates a handle to an entity the service already knows.
    pub fn with_id(kind: EntityKind, id: impl Into<String>, attributes: Map<String, Value>) -> Self {
        Self::build(kind, Some(id.into()), attributes)
    }

    /// Creates an entity from a wire record.
    pub fn from_record(kind: EntityKind, record: EntityRecord) -> Self {
        Self::build(kind, Some(record.id), record.attributes)
    }

    fn build(kind: EntityKind, id: Option<String>, attributes: Map<String, Value>) -> Self {
        Self {
            inner: Arc::new(EntityState {
                kind,
                id: RwLock::new(id),
                attributes: RwLock::new(attributes),
                links: RwLock::new(BTreeMap::new()),
                related: RwLock::new(RelatedCache::default()),
                context: RwLock::new(None),
            }),
        }
    }

    /// Returns the entity kind.
    pub fn kind(&self) -> EntityKind {
        self.inner.kind
    }

    /// Returns the server-assigned identity, if committed.
    pub fn id(&self) -> Option<String> {
        self.inner.id.read().clone()
    }

    /// Returns `true` once the service has assigned an identity.
    pub fn has_identity(&self) -> bool {
        self.inner.id.read().is_some()
    }

    /// Returns a copy of one attribute.
    pub fn attribute(&self, name: &str) -> Option<Value> {
        self.inner.attributes.read().get(name).cloned()
    }

    /// Returns a copy of all attributes.
    pub fn attributes(&self) -> Map<String, Value> {
        self.inner.attributes.read().clone()
    }

    /// Sets an attribute locally. Nothing is sent to the service.
    pub fn set_attribute(&self, name: impl Into<String>, value: Value) {
        self.inner.attributes.write().insert(name.into(), value);
    }

    /// Returns the entity a relation slot points at, if linked.
    pub fn link(&self, relation: &str) -> Option<RemoteEntity> {
        self.inner.links.read().get(relation).cloned()
    }

    /// Returns `true` if both handles refer to the same entity.
    pub fn same_entity(&self, other: &RemoteEntity) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns the owning context, if bound and still alive.
    pub fn context(&self) -> Option<MediaContext> {
        self.inner.context.read().as_ref().and_then(WeakContext::upgrade)
    }

    pub(crate) fn bind(&self, context: WeakContext) {
        *self.inner.context.write() = Some(context);
    }

    pub(crate) fn assign_id(&self, id: String) {
        *self.inner.id.write() = Some(id);
    }

    pub(crate) fn merge_attributes(&self, attributes: Map<String, Value>) {
        self.inner.attributes.write().extend(attributes);
    }

    pub(crate) fn set_link(&self, relation: impl Into<String>, target: RemoteEntity) {
        self.inner.links.write().insert(relation.into(), target);
    }

    /// Returns a derived collection, fetching it on first access.
    ///
    /// `navigation` names a collection derived from links pointing at this
    /// entity, such as an asset's `"Locators"`. The result is cached until
    /// [`invalidate_related`](Self::invalidate_related) is called, which a
    /// linked save does for every entity it links to.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if this kind has no such derived collection
    /// - `InvalidState` if the entity has no identity or no live context
    /// - remote failures from the query, after retries
    #[tracing::instrument(skip(self), fields(kind = %self.kind(), id = ?self.id()))]
    pub async fn related(&self, navigation: &str) -> Result<Vec<RemoteEntity>> {
        let target = self.kind().navigation_target(navigation).ok_or_else(|| {
            Error::invalid_argument(format!(
                "{} has no derived collection '{}'",
                self.kind(),
                navigation
            ))
        })?;

        let (cached, generation) = {
            let cache = self.inner.related.read();
            (cache.entries.get(navigation).cloned(), cache.generation(navigation))
        };
        if let Some(cached) = cached {
            return Ok(cached);
        }

        let id = self
            .id()
            .ok_or_else(|| Error::invalid_state("entity has no server identity"))?;
        let context = self
            .context()
            .ok_or_else(|| Error::invalid_state("entity is not bound to a live context"))?;

        let query = Query::navigation(self.kind(), id, navigation, target);
        let entities = context.query(&query).await?;

        tracing::debug!(count = entities.len(), "fetched derived collection");
        {
            let mut cache = self.inner.related.write();
            if cache.generation(navigation) == generation {
                cache
                    .entries
                    .insert(navigation.to_string(), entities.clone());
            } else {
                tracing::debug!(navigation, "invalidated during fetch, result not cached");
            }
        }
        Ok(entities)
    }

    /// Marks a derived collection stale so the next access re-fetches it.
    ///
    /// A fetch already in flight when this is called does not repopulate the
    /// cache with its result.
    pub fn invalidate_related(&self, navigation: &str) {
        let mut cache = self.inner.related.write();
        cache.entries.remove(navigation);
        *cache.generations.entry(navigation.to_string()).or_default() += 1;
    }

    /// Returns `true` if a derived collection is currently cached.
    pub fn is_related_cached(&self, navigation: &str) -> bool {
        self.inner.related.read().entries.contains_key(navigation)
    }
}

impl std::fmt::Debug for RemoteEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteEntity")
            .field("kind", &self.kind())
            .field("id", &self.id())
            .field("links", &self.inner.links.read().keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use serde_json::json;

    fn attrs(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_new_entity_has_no_identity() {
        let locator = RemoteEntity::new(EntityKind::Locator, attrs(json!({ "Type": 1 })));
        assert!(!locator.has_identity());
        assert!(locator.link("Asset").is_none());
        assert!(locator.context().is_none());
    }

    #[test]
    fn test_clones_share_state() {
        let asset = RemoteEntity::new(EntityKind::Asset, Map::new());
        let clone = asset.clone();
        asset.assign_id("nb:cid:1".into());
        asset.set_attribute("Name", json!("movie"));

        assert!(clone.same_entity(&asset));
        assert_eq!(clone.id().as_deref(), Some("nb:cid:1"));
        assert_eq!(clone.attribute("Name"), Some(json!("movie")));

        let other = RemoteEntity::with_id(EntityKind::Asset, "nb:cid:1", Map::new());
        assert!(!other.same_entity(&asset));
    }

    #[test]
    fn test_links() {
        let asset = RemoteEntity::with_id(EntityKind::Asset, "nb:cid:1", Map::new());
        let locator = RemoteEntity::new(EntityKind::Locator, Map::new());
        locator.set_link("Asset", asset.clone());
        assert!(locator.link("Asset").is_some_and(|a| a.same_entity(&asset)));
        assert!(format!("{:?}", locator).contains("Asset"));
    }

    #[test]
    fn test_record_roundtrip_flattens_attributes() {
        let record: EntityRecord =
            serde_json::from_value(json!({ "Id": "nb:cid:7", "Name": "clip", "Options": 0 }))
                .expect("record");
        let asset = RemoteEntity::from_record(EntityKind::Asset, record);
        assert_eq!(asset.id().as_deref(), Some("nb:cid:7"));
        assert_eq!(asset.attribute("Options"), Some(json!(0)));
        assert!(asset.attribute("Id").is_none());
    }

    #[tokio::test]
    async fn test_related_unknown_navigation() {
        let asset = RemoteEntity::with_id(EntityKind::Asset, "nb:cid:1", Map::new());
        let err = asset.related("Jobs").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn test_related_requires_context() {
        let asset = RemoteEntity::with_id(EntityKind::Asset, "nb:cid:1", Map::new());
        let err = asset.related("Locators").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert!(!asset.is_related_cached("Locators"));
    }
}
