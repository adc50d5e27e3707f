//! Storage accounts.

use std::ops::Deref;

use serde_json::Value;

use super::EntityCollection;
use crate::context::WeakContext;
use crate::error::Result;
use crate::types::{EntityKind, RemoteEntity};

/// Attribute flagging the account new assets are stored in.
pub const IS_DEFAULT_ATTRIBUTE: &str = "IsDefault";

/// Storage accounts attached to the media account.
#[derive(Clone, Debug)]
pub struct StorageAccountCollection {
    entities: EntityCollection,
}

impl StorageAccountCollection {
    pub(crate) fn new(context: WeakContext) -> Self {
        Self {
            entities: EntityCollection::new(EntityKind::StorageAccount, context),
        }
    }

    /// Returns the account flagged `IsDefault`, if any.
    ///
    /// Never cached: each call filters a fresh listing.
    pub async fn default_account(&self) -> Result<Option<RemoteEntity>> {
        self.entities
            .first_where(|account| account.attribute(IS_DEFAULT_ATTRIBUTE) == Some(Value::Bool(true)))
            .await
    }
}

impl Deref for StorageAccountCollection {
    type Target = EntityCollection;

    fn deref(&self) -> &EntityCollection {
        &self.entities
    }
}
