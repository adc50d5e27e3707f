//! Locator provisioning.

use std::ops::Deref;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Value, json};

use super::{EntityCollection, fields};
use crate::context::WeakContext;
use crate::error::Result;
use crate::save::LinkReference;
use crate::types::{EntityKind, LocatorType, RemoteEntity};

/// Relation linking a locator to its access policy.
pub const ACCESS_POLICY_RELATION: &str = "AccessPolicy";

/// Relation linking a locator to its asset.
pub const ASSET_RELATION: &str = "Asset";

/// Locators granting time-limited access to assets.
///
/// A new locator is linked to an existing asset and access policy in one
/// save transaction. After the commit the asset's cached `Locators`
/// collection is stale and is fetched again on next access.
#[derive(Clone, Debug)]
pub struct LocatorCollection {
    entities: EntityCollection,
}

impl LocatorCollection {
    pub(crate) fn new(context: WeakContext) -> Self {
        Self {
            entities: EntityCollection::new(EntityKind::Locator, context),
        }
    }

    /// Creates a locator of `locator_type` for `asset` governed by `policy`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` without any remote call if `asset` or `policy` is
    /// of the wrong kind or has no server identity. Remote failures surface
    /// as `PermanentRemote` or `RetryExhausted`.
    pub async fn create_locator(
        &self,
        locator_type: LocatorType,
        asset: &RemoteEntity,
        policy: &RemoteEntity,
        start_time: Option<DateTime<Utc>>,
    ) -> Result<RemoteEntity> {
        let mut attributes = fields([("Type", json!(locator_type))]);
        if let Some(start_time) = start_time {
            attributes.insert(
                "StartTime".to_string(),
                Value::String(start_time.to_rfc3339_opts(SecondsFormat::Secs, true)),
            );
        }

        self.entities
            .create_linked(
                attributes,
                &[
                    LinkReference::new(ACCESS_POLICY_RELATION, policy),
                    LinkReference::new(ASSET_RELATION, asset),
                ],
            )
            .await
    }

    /// Creates a shared access signature locator.
    pub async fn create_sas_locator(
        &self,
        asset: &RemoteEntity,
        policy: &RemoteEntity,
        start_time: Option<DateTime<Utc>>,
    ) -> Result<RemoteEntity> {
        self.create_locator(LocatorType::Sas, asset, policy, start_time)
            .await
    }

    /// Blocking form of [`create_locator`](Self::create_locator).
    #[cfg(feature = "blocking")]
    #[cfg_attr(docsrs, doc(cfg(feature = "blocking")))]
    pub fn create_locator_blocking(
        &self,
        locator_type: LocatorType,
        asset: &RemoteEntity,
        policy: &RemoteEntity,
        start_time: Option<DateTime<Utc>>,
    ) -> Result<RemoteEntity> {
        crate::blocking::block_on(self.create_locator(locator_type, asset, policy, start_time))?
    }

    /// Blocking form of [`create_sas_locator`](Self::create_sas_locator).
    #[cfg(feature = "blocking")]
    #[cfg_attr(docsrs, doc(cfg(feature = "blocking")))]
    pub fn create_sas_locator_blocking(
        &self,
        asset: &RemoteEntity,
        policy: &RemoteEntity,
        start_time: Option<DateTime<Utc>>,
    ) -> Result<RemoteEntity> {
        crate::blocking::block_on(self.create_sas_locator(asset, policy, start_time))?
    }
}

impl Deref for LocatorCollection {
    type Target = EntityCollection;

    fn deref(&self) -> &EntityCollection {
        &self.entities
    }
}
