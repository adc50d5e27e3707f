//! Query descriptions handed to the query executor.
//!
//! A query only names *what* to read: a whole entity set, one entity, or a
//! derived collection of one entity. Filtering beyond that happens in memory
//! over the returned snapshot.

use crate::types::EntityKind;

/// Which slice of an entity set a query reads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryScope {
    /// Every entity of the kind.
    All,
    /// One entity by identity.
    ById(String),
    /// A derived collection of another entity.
    Navigation {
        /// Kind of the entity owning the collection.
        parent: EntityKind,
        /// Identity of the owning entity.
        parent_id: String,
        /// Name of the derived collection.
        navigation: String,
    },
}

/// A read against the remote entity store.
///
/// ```rust
/// use cloudmedia::service::Query;
/// use cloudmedia::types::EntityKind;
///
/// assert_eq!(Query::all(EntityKind::Asset).path(), "Assets");
/// assert_eq!(Query::by_id(EntityKind::Asset, "a1").path(), "Assets('a1')");
/// assert_eq!(
///     Query::navigation(EntityKind::Asset, "a1", "Locators", EntityKind::Locator).path(),
///     "Assets('a1')/Locators",
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query {
    kind: EntityKind,
    scope: QueryScope,
}

impl Query {
    /// Reads every entity of a kind.
    pub fn all(kind: EntityKind) -> Self {
        Self {
            kind,
            scope: QueryScope::All,
        }
    }

    /// Reads one entity by identity.
    pub fn by_id(kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            scope: QueryScope::ById(id.into()),
        }
    }

    /// Reads a derived collection of `parent`, listing entities of `kind`.
    pub fn navigation(
        parent: EntityKind,
        parent_id: impl Into<String>,
        navigation: impl Into<String>,
        kind: EntityKind,
    ) -> Self {
        Self {
            kind,
            scope: QueryScope::Navigation {
                parent,
                parent_id: parent_id.into(),
                navigation: navigation.into(),
            },
        }
    }

    /// Kind of the entities the query returns.
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Returns the scope.
    pub fn scope(&self) -> &QueryScope {
        &self.scope
    }

    /// Returns `true` if the query yields at most one entity.
    pub fn expects_single(&self) -> bool {
        matches!(self.scope, QueryScope::ById(_))
    }

    /// Resource path relative to the service root.
    pub fn path(&self) -> String {
        match &self.scope {
            QueryScope::All => self.kind.entity_set().to_string(),
            QueryScope::ById(id) => format!("{}('{}')", self.kind.entity_set(), encode_key(id)),
            QueryScope::Navigation {
                parent,
                parent_id,
                navigation,
            } => format!(
                "{}('{}')/{}",
                parent.entity_set(),
                encode_key(parent_id),
                navigation
            ),
        }
    }
}

/// Encodes an identity for use inside a quoted key segment.
fn encode_key(id: &str) -> String {
    let quoted = id.replace('\'', "''");
    url::form_urlencoded::byte_serialize(quoted.as_bytes()).collect()
}
