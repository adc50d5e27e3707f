//! Single-use save transactions.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Error, ErrorKind, Result};
use crate::retry::{CancellationToken, RetryPolicy};
use crate::service::{EntityKey, SaveBatch, SaveExecutor, SaveOperation, SaveResult};
use crate::types::RemoteEntity;

/// Lifecycle of a [`SaveTransaction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Accepting operations.
    Opened,
    /// Commit in flight.
    Committing,
    /// Applied by the service.
    Committed,
    /// Commit failed; nothing was applied.
    Failed,
}

impl TransactionState {
    /// Returns `true` for `Committed` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionState::Committed | TransactionState::Failed)
    }
}

struct PendingLink {
    source: RemoteEntity,
    relation: String,
    target: RemoteEntity,
}

/// Ordered batch of attach, add and set-link operations committed
/// atomically.
///
/// An entity must be attached (existing) or added (new) before it can take
/// part in a link. After [`commit`](Self::commit) the transaction is spent:
/// every further call fails with `InvalidState`.
///
/// The batch id is generated when the transaction opens and sent with every
/// commit attempt, so retries of a commit that already reached the service
/// are recognizable.
pub struct SaveTransaction {
    batch_id: Uuid,
    state: TransactionState,
    operations: Vec<SaveOperation>,
    tracked: Vec<(RemoteEntity, EntityKey)>,
    links: Vec<PendingLink>,
    next_content_id: u32,
    executor: Arc<dyn SaveExecutor>,
}

impl SaveTransaction {
    /// Opens a transaction that commits through `executor`.
    pub fn open(executor: Arc<dyn SaveExecutor>) -> Self {
        Self {
            batch_id: Uuid::new_v4(),
            state: TransactionState::Opened,
            operations: Vec::new(),
            tracked: Vec::new(),
            links: Vec::new(),
            next_content_id: 1,
            executor,
        }
    }

    /// Returns the idempotency key sent with every commit attempt.
    pub fn batch_id(&self) -> Uuid {
        self.batch_id
    }

    /// Returns the current state.
    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Returns the pending operations in issue order.
    pub fn operations(&self) -> &[SaveOperation] {
        &self.operations
    }

    fn ensure_open(&self) -> Result<()> {
        if self.state == TransactionState::Opened {
            Ok(())
        } else {
            Err(Error::invalid_state(format!(
                "save transaction is {:?}",
                self.state
            )))
        }
    }

    fn key_of(&self, entity: &RemoteEntity) -> Option<&EntityKey> {
        self.tracked
            .iter()
            .find(|(tracked, _)| tracked.same_entity(entity))
            .map(|(_, key)| key)
    }

    /// Makes an existing entity addressable in this transaction.
    ///
    /// Attaching the same entity twice is a no-op.
    pub fn attach(&mut self, entity: &RemoteEntity) -> Result<()> {
        self.ensure_open()?;

        match self.key_of(entity) {
            Some(EntityKey::Existing { .. }) => return Ok(()),
            Some(EntityKey::New { .. }) => {
                return Err(Error::invalid_argument(
                    "entity was added as new in this transaction",
                ));
            }
            None => {}
        }

        let id = entity.id().ok_or_else(|| {
            Error::invalid_argument(format!(
                "cannot attach {} entity without a server identity",
                entity.kind()
            ))
        })?;

        self.operations.push(SaveOperation::Attach {
            kind: entity.kind(),
            id: id.clone(),
        });
        self.tracked.push((
            entity.clone(),
            EntityKey::Existing {
                kind: entity.kind(),
                id,
            },
        ));
        Ok(())
    }

    /// Schedules creation of a new entity.
    pub fn add(&mut self, entity: &RemoteEntity) -> Result<()> {
        self.ensure_open()?;

        if entity.has_identity() {
            return Err(Error::invalid_argument(format!(
                "{} entity already has a server identity",
                entity.kind()
            )));
        }
        if self.key_of(entity).is_some() {
            return Err(Error::invalid_argument("entity is already part of this transaction"));
        }

        let content_id = self.next_content_id;
        self.next_content_id += 1;

        self.operations.push(SaveOperation::Add {
            content_id,
            kind: entity.kind(),
            attributes: entity.attributes(),
        });
        self.tracked
            .push((entity.clone(), EntityKey::New { content_id }));
        Ok(())
    }

    /// Points `relation` of `source` at `target`.
    ///
    /// Both entities must already be attached or added, the relation must be
    /// declared for the source kind and the target must be of the kind it
    /// expects. Each relation of a source can be set once.
    pub fn set_link(
        &mut self,
        source: &RemoteEntity,
        relation: &str,
        target: &RemoteEntity,
    ) -> Result<()> {
        self.ensure_open()?;

        let declared = source.kind().relation(relation).ok_or_else(|| {
            Error::invalid_argument(format!(
                "relation '{}' is not declared for {}",
                relation,
                source.kind()
            ))
        })?;
        if declared.target != target.kind() {
            return Err(Error::invalid_argument(format!(
                "relation '{}' expects {}, got {}",
                relation,
                declared.target,
                target.kind()
            )));
        }

        let source_key = self.key_of(source).cloned().ok_or_else(|| {
            Error::invalid_argument(format!(
                "source of relation '{}' is not part of this transaction",
                relation
            ))
        })?;
        let target_key = self.key_of(target).cloned().ok_or_else(|| {
            Error::invalid_argument(format!(
                "target of relation '{}' is not part of this transaction",
                relation
            ))
        })?;

        if self
            .links
            .iter()
            .any(|link| link.source.same_entity(source) && link.relation == relation)
        {
            return Err(Error::invalid_argument(format!(
                "relation '{}' is already set in this transaction",
                relation
            )));
        }

        self.operations.push(SaveOperation::SetLink {
            source: source_key,
            relation: relation.to_string(),
            target: target_key,
        });
        self.links.push(PendingLink {
            source: source.clone(),
            relation: relation.to_string(),
            target: target.clone(),
        });
        Ok(())
    }

    /// Commits every pending operation in one batch under `policy`.
    ///
    /// On success, added entities receive their server identity and
    /// attributes and every linked relation slot is populated. On failure
    /// no entity is touched.
    #[tracing::instrument(skip_all, fields(batch_id = %self.batch_id, operations = self.operations.len()))]
    pub async fn commit(
        &mut self,
        policy: &RetryPolicy,
        token: Option<&CancellationToken>,
    ) -> Result<Vec<SaveResult>> {
        self.ensure_open()?;
        self.state = TransactionState::Committing;

        let batch = SaveBatch {
            batch_id: self.batch_id,
            operations: self.operations.clone(),
        };
        let executor = Arc::clone(&self.executor);
        let attempt = || executor.save(&batch);

        let outcome = match token {
            Some(token) => policy.execute_with_cancel(attempt, token).await,
            None => policy.execute(attempt).await,
        };

        match outcome.and_then(|results| self.apply(results)) {
            Ok(results) => {
                self.state = TransactionState::Committed;
                debug!("save transaction committed");
                Ok(results)
            }
            Err(err) => {
                self.state = TransactionState::Failed;
                warn!(error = %err, "save transaction failed");
                Err(err)
            }
        }
    }

    fn apply(&self, results: Vec<SaveResult>) -> Result<Vec<SaveResult>> {
        let created: Vec<(&RemoteEntity, &SaveResult)> = self
            .tracked
            .iter()
            .filter_map(|(entity, key)| match key {
                EntityKey::New { content_id } => Some((entity, *content_id)),
                EntityKey::Existing { .. } => None,
            })
            .map(|(entity, content_id)| {
                results
                    .iter()
                    .find(|result| result.content_id == content_id)
                    .map(|result| (entity, result))
                    .ok_or_else(|| {
                        Error::new(
                            ErrorKind::InvalidResponse,
                            format!("no identity returned for content id {}", content_id),
                        )
                    })
            })
            .collect::<Result<_>>()?;

        for (entity, result) in created {
            entity.assign_id(result.id.clone());
            entity.merge_attributes(result.attributes.clone());
        }
        for link in &self.links {
            link.source.set_link(link.relation.clone(), link.target.clone());
        }
        Ok(results)
    }
}

impl std::fmt::Debug for SaveTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveTransaction")
            .field("batch_id", &self.batch_id)
            .field("state", &self.state)
            .field("operations", &self.operations.len())
            .finish_non_exhaustive()
    }
}
