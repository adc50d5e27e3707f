//! Creation of an entity together with its links to existing entities.

use serde_json::{Map, Value};
use tracing::debug;

use super::SaveTransaction;
use crate::context::MediaContext;
use crate::error::{Error, Result};
use crate::retry::{CancellationToken, RetryPolicy};
use crate::types::{EntityKind, Relation, RemoteEntity};

/// A relation of the entity being created and the existing entity it
/// points at.
#[derive(Debug, Clone)]
pub struct LinkReference {
    relation: String,
    target: RemoteEntity,
}

impl LinkReference {
    /// Creates a reference for `relation` pointing at `target`.
    pub fn new(relation: impl Into<String>, target: &RemoteEntity) -> Self {
        Self {
            relation: relation.into(),
            target: target.clone(),
        }
    }

    /// Relation name.
    pub fn relation(&self) -> &str {
        &self.relation
    }

    /// Entity the relation points at.
    pub fn target(&self) -> &RemoteEntity {
        &self.target
    }
}

/// Creates one entity and links it to existing ones in a single save
/// transaction.
///
/// Steps:
///
/// 1. validate every reference, before anything is sent;
/// 2. build the new entity in memory and bind it to the context;
/// 3. attach each referenced entity, add the new one, then set each link in
///    reference order;
/// 4. commit under the save retry policy;
/// 5. invalidate the inverse derived collection of every referenced entity
///    (e.g. the `Locators` of an asset) and return the new entity.
///
/// If the commit fails the new entity is dropped and no cached collection
/// is touched.
///
/// ## Example
///
/// ```rust,ignore
/// let locator = LinkedSaveWorkflow::new(&context)
///     .create_linked(
///         EntityKind::Locator,
///         fields,
///         &[
///             LinkReference::new("AccessPolicy", &policy),
///             LinkReference::new("Asset", &asset),
///         ],
///     )
///     .await?;
/// ```
pub struct LinkedSaveWorkflow<'a> {
    context: &'a MediaContext,
    policy: RetryPolicy,
    token: Option<&'a CancellationToken>,
}

impl<'a> LinkedSaveWorkflow<'a> {
    /// Creates a workflow committing under the context's save policy.
    pub fn new(context: &'a MediaContext) -> Self {
        Self {
            context,
            policy: context.save_policy().clone(),
            token: None,
        }
    }

    /// Replaces the retry policy used for the commit.
    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Stops retrying the commit once `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: &'a CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Checks that every reference may be linked from a new `kind` entity.
    ///
    /// Each relation must be declared for `kind` and given at most once, and
    /// each target must have a server identity and be of the kind the
    /// relation expects.
    pub fn validate(kind: EntityKind, references: &[LinkReference]) -> Result<Vec<&'static Relation>> {
        let mut relations: Vec<&'static Relation> = Vec::with_capacity(references.len());

        for reference in references {
            let relation = kind.relation(reference.relation()).ok_or_else(|| {
                Error::invalid_argument(format!(
                    "relation '{}' is not declared for {}",
                    reference.relation(),
                    kind
                ))
            })?;

            if relations.iter().any(|seen| seen.name == relation.name) {
                return Err(Error::invalid_argument(format!(
                    "relation '{}' is given more than once",
                    relation.name
                )));
            }

            let target = reference.target();
            if target.kind() != relation.target {
                return Err(Error::invalid_argument(format!(
                    "relation '{}' expects {}, got {}",
                    relation.name,
                    relation.target,
                    target.kind()
                )));
            }
            if !target.has_identity() {
                return Err(Error::invalid_argument(format!(
                    "target of relation '{}' has no server identity",
                    relation.name
                )));
            }

            relations.push(relation);
        }

        Ok(relations)
    }

    /// Creates a `kind` entity with `fields`, linked to `references`.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if a reference fails validation (nothing is sent)
    /// - `PermanentRemote` if the service rejects the commit
    /// - `RetryExhausted` if transient failures outlive the retry budget
    /// - `Cancelled` if the token fires between attempts
    #[tracing::instrument(skip_all, fields(kind = %kind, references = references.len()))]
    pub async fn create_linked(
        &self,
        kind: EntityKind,
        fields: Map<String, Value>,
        references: &[LinkReference],
    ) -> Result<RemoteEntity> {
        let relations = Self::validate(kind, references)?;

        let entity = RemoteEntity::new(kind, fields);
        entity.bind(self.context.downgrade());

        let mut transaction =
            SaveTransaction::open(self.context.service_factory().save_executor());
        for reference in references {
            transaction.attach(reference.target())?;
        }
        transaction.add(&entity)?;
        for reference in references {
            transaction.set_link(&entity, reference.relation(), reference.target())?;
        }

        transaction.commit(&self.policy, self.token).await?;

        for (reference, relation) in references.iter().zip(&relations) {
            if let Some(inverse) = relation.inverse {
                reference.target().invalidate_related(inverse);
            }
        }

        debug!(id = ?entity.id(), "linked entity created");
        Ok(entity)
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
}
