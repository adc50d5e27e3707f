//! Assets.

use std::ops::Deref;

use serde_json::json;

use super::{EntityCollection, fields};
use crate::context::WeakContext;
use crate::error::Result;
use crate::types::{AssetOptions, EntityKind, RemoteEntity};

/// Media assets.
#[derive(Clone, Debug)]
pub struct AssetCollection {
    entities: EntityCollection,
}

impl AssetCollection {
    pub(crate) fn new(context: WeakContext) -> Self {
        Self {
            entities: EntityCollection::new(EntityKind::Asset, context),
        }
    }

    /// Creates an empty asset.
    pub async fn create_asset(&self, name: &str, options: AssetOptions) -> Result<RemoteEntity> {
        self.entities
            .create(fields([("Name", json!(name)), ("Options", json!(options))]))
            .await
    }
}

impl Deref for AssetCollection {
    type Target = EntityCollection;

    fn deref(&self) -> &EntityCollection {
        &self.entities
    }
}
