//! InMemoryService for testing with real save semantics.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::config::RetryConfig;
use crate::context::MediaContext;
use crate::error::{Error, Result};
use crate::service::{
    EntityKey, Query, QueryExecutor, QueryScope, SaveBatch, SaveExecutor, SaveOperation,
    SaveResult, ServiceFactory,
};
use crate::transport::MockTransport;
use crate::types::{EntityKind, EntityRecord, RemoteEntity};

/// An in-memory media service.
///
/// Stores entities and links, applies save batches atomically and answers
/// queries, including derived collections such as an asset's `Locators`.
/// A batch whose id was already applied is answered from the first
/// outcome without being applied again.
///
/// Failures can be scripted per call to exercise retry behavior.
///
/// ## Example
///
/// ```rust
/// use cloudmedia::testing::InMemoryService;
/// use cloudmedia::types::EntityKind;
/// use serde_json::json;
///
/// let service = InMemoryService::new();
/// let asset = service.seed(EntityKind::Asset, json!({ "Name": "movie" }));
/// assert!(asset.has_identity());
///
/// service.fail_next_saves(503, 2);
/// let context = service.context()?;
/// assert_eq!(context.initialized_collections(), 0);
/// # Ok::<(), cloudmedia::Error>(())
/// ```
#[derive(Clone, Default)]
pub struct InMemoryService {
    state: Arc<Mutex<State>>,
}

#[derive(Default)]
struct State {
    entities: BTreeMap<EntityKind, BTreeMap<String, Map<String, Value>>>,
    links: Vec<StoredLink>,
    applied: HashMap<Uuid, Vec<SaveResult>>,
    save_failures: VecDeque<u16>,
    query_failures: VecDeque<u16>,
    lost_responses: u32,
    save_calls: u64,
    query_calls: u64,
    batches: Vec<SaveBatch>,
    next_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StoredLink {
    source: (EntityKind, String),
    relation: String,
    target: (EntityKind, String),
}

impl State {
    fn allocate_id(&mut self) -> String {
        self.next_id += 1;
        format!("nb:id:{}", self.next_id)
    }

    fn contains(&self, kind: EntityKind, id: &str) -> bool {
        self.entities
            .get(&kind)
            .is_some_and(|entities| entities.contains_key(id))
    }

    fn records(&self, kind: EntityKind) -> impl Iterator<Item = EntityRecord> + '_ {
        self.entities
            .get(&kind)
            .into_iter()
            .flat_map(|entities| entities.iter())
            .map(|(id, attributes)| EntityRecord {
                id: id.clone(),
                attributes: attributes.clone(),
            })
    }

    fn apply(&mut self, batch: &SaveBatch) -> Result<Vec<SaveResult>> {
        let mut created: BTreeMap<u32, (EntityKind, String, Map<String, Value>)> = BTreeMap::new();
        let mut links = Vec::new();
        let mut next_id = self.next_id;

        for operation in &batch.operations {
            match operation {
                SaveOperation::Attach { kind, id } => {
                    if !self.contains(*kind, id) {
                        return Err(rejected(404, format!("{}('{}') does not exist", kind, id)));
                    }
                }
                SaveOperation::Add {
                    content_id,
                    kind,
                    attributes,
                } => {
                    next_id += 1;
                    created.insert(
                        *content_id,
                        (*kind, format!("nb:id:{}", next_id), attributes.clone()),
                    );
                }
                SaveOperation::SetLink {
                    source,
                    relation,
                    target,
                } => {
                    let source = resolve(source, &created)?;
                    let target = resolve(target, &created)?;
                    links.push(StoredLink {
                        source,
                        relation: relation.clone(),
                        target,
                    });
                }
            }
        }

        self.next_id = next_id;
        self.links.extend(links);
        let stamp = Value::String(chrono::Utc::now().to_rfc3339());

        Ok(created
            .into_iter()
            .map(|(content_id, (kind, id, mut attributes))| {
                attributes.insert("Created".to_string(), stamp.clone());
                self.entities
                    .entry(kind)
                    .or_default()
                    .insert(id.clone(), attributes);
                let mut computed = Map::new();
                computed.insert("Created".to_string(), stamp.clone());
                SaveResult {
                    content_id,
                    id,
                    attributes: computed,
                }
            })
            .collect())
    }

    fn navigation(
        &self,
        kind: EntityKind,
        parent: EntityKind,
        parent_id: &str,
        navigation: &str,
    ) -> Vec<EntityRecord> {
        let Some(relation) = kind
            .relations()
            .iter()
            .find(|r| r.target == parent && r.inverse == Some(navigation))
        else {
            return Vec::new();
        };

        self.records(kind)
            .filter(|record| {
                self.links.iter().any(|link| {
                    link.source == (kind, record.id.clone())
                        && link.relation == relation.name
                        && link.target == (parent, parent_id.to_string())
                })
            })
            .collect()
    }
}

fn resolve(
    key: &EntityKey,
    created: &BTreeMap<u32, (EntityKind, String, Map<String, Value>)>,
) -> Result<(EntityKind, String)> {
    match key {
        EntityKey::Existing { kind, id } => Ok((*kind, id.clone())),
        EntityKey::New { content_id } => created
            .get(content_id)
            .map(|(kind, id, _)| (*kind, id.clone()))
            .ok_or_else(|| rejected(400, format!("unknown content id {}", content_id))),
    }
}

fn rejected(status: u16, message: String) -> Error {
    Error::save_execution(message.clone())
        .with_status(status)
        .with_source(Error::transport(message, Some(status)))
}

impl InMemoryService {
    /// Creates an empty service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a context served by this service.
    ///
    /// Retries use a 1 ms initial delay without jitter so tests stay fast.
    ///
    /// # Errors
    ///
    /// Returns the builder's `Configuration` error if the context cannot be
    /// built.
    pub fn context(&self) -> Result<MediaContext> {
        self.context_with(
            RetryConfig::new()
                .with_initial_delay(Duration::from_millis(1))
                .with_max_delay(Duration::from_millis(10))
                .with_jitter(0.0),
        )
    }

    /// Builds a context served by this service with a custom retry
    /// configuration.
    pub fn context_with(&self, retry_config: RetryConfig) -> Result<MediaContext> {
        MediaContext::builder()
            .transport(Arc::new(MockTransport::new()))
            .retry_config(retry_config)
            .service_factory(Arc::new(self.clone()))
            .build()
    }

    /// Stores an entity and returns an unbound handle to it.
    pub fn seed(&self, kind: EntityKind, attributes: Value) -> RemoteEntity {
        let attributes = match attributes {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let mut state = self.state.lock();
        let id = state.allocate_id();
        state
            .entities
            .entry(kind)
            .or_default()
            .insert(id.clone(), attributes.clone());
        RemoteEntity::with_id(kind, id, attributes)
    }

    /// Makes the next `times` save calls fail with `status` without
    /// applying anything.
    pub fn fail_next_saves(&self, status: u16, times: usize) {
        self.state
            .lock()
            .save_failures
            .extend(std::iter::repeat_n(status, times));
    }

    /// Makes the next `times` query calls fail with `status`.
    pub fn fail_next_queries(&self, status: u16, times: usize) {
        self.state
            .lock()
            .query_failures
            .extend(std::iter::repeat_n(status, times));
    }

    /// Makes the next `times` save calls apply the batch but answer with a
    /// 504, as if the response had been lost.
    pub fn lose_next_save_responses(&self, times: u32) {
        self.state.lock().lost_responses += times;
    }

    /// Number of save calls received.
    pub fn save_calls(&self) -> u64 {
        self.state.lock().save_calls
    }

    /// Number of query calls received.
    pub fn query_calls(&self) -> u64 {
        self.state.lock().query_calls
    }

    /// Every batch received, including failed and repeated ones.
    pub fn recorded_batches(&self) -> Vec<SaveBatch> {
        self.state.lock().batches.clone()
    }

    /// Number of stored entities of `kind`.
    pub fn entity_count(&self, kind: EntityKind) -> usize {
        self.state
            .lock()
            .entities
            .get(&kind)
            .map_or(0, BTreeMap::len)
    }

    /// Returns the stored attributes of an entity.
    pub fn entity(&self, kind: EntityKind, id: &str) -> Option<Map<String, Value>> {
        self.state
            .lock()
            .entities
            .get(&kind)
            .and_then(|entities| entities.get(id))
            .cloned()
    }

    /// Returns `(relation, target kind, target id)` for every stored link of
    /// an entity.
    pub fn links_of(&self, kind: EntityKind, id: &str) -> Vec<(String, EntityKind, String)> {
        self.state
            .lock()
            .links
            .iter()
            .filter(|link| link.source.0 == kind && link.source.1 == id)
            .map(|link| (link.relation.clone(), link.target.0, link.target.1.clone()))
            .collect()
    }
}

#[async_trait]
impl QueryExecutor for InMemoryService {
    async fn execute(&self, query: &Query) -> Result<Vec<EntityRecord>> {
        let mut state = self.state.lock();
        state.query_calls += 1;

        if let Some(status) = state.query_failures.pop_front() {
            let message = format!("query {} failed with {}", query.path(), status);
            return Err(Error::query_execution(message.clone())
                .with_status(status)
                .with_source(Error::transport(message, Some(status))));
        }

        let kind = query.kind();
        Ok(match query.scope() {
            QueryScope::All => state.records(kind).collect(),
            QueryScope::ById(id) => state.records(kind).filter(|r| &r.id == id).collect(),
            QueryScope::Navigation {
                parent,
                parent_id,
                navigation,
            } => state.navigation(kind, *parent, parent_id, navigation),
        })
    }
}

#[async_trait]
impl SaveExecutor for InMemoryService {
    async fn save(&self, batch: &SaveBatch) -> Result<Vec<SaveResult>> {
        let mut state = self.state.lock();
        state.save_calls += 1;
        state.batches.push(batch.clone());

        if let Some(status) = state.save_failures.pop_front() {
            return Err(rejected(status, format!("batch failed with {}", status)));
        }

        let cached = state.applied.get(&batch.batch_id).cloned();
        let results = match cached {
            Some(results) => results,
            None => {
                let results = state.apply(batch)?;
                state.applied.insert(batch.batch_id, results.clone());
                results
            }
        };

        if state.lost_responses > 0 {
            state.lost_responses -= 1;
            return Err(rejected(504, "response lost".to_string()));
        }

        Ok(results)
    }
}

impl ServiceFactory for InMemoryService {
    fn query_executor(&self) -> Arc<dyn QueryExecutor> {
        Arc::new(self.clone())
    }

    fn save_executor(&self) -> Arc<dyn SaveExecutor> {
        Arc::new(self.clone())
    }
}
