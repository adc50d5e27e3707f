//! Access policies.

use std::ops::Deref;
use std::time::Duration;

use serde_json::json;

use super::{EntityCollection, fields};
use crate::context::WeakContext;
use crate::error::Result;
use crate::types::{AccessPermissions, EntityKind, RemoteEntity};

/// Access policies: how long and for what a locator grants access.
#[derive(Clone, Debug)]
pub struct AccessPolicyCollection {
    entities: EntityCollection,
}

impl AccessPolicyCollection {
    pub(crate) fn new(context: WeakContext) -> Self {
        Self {
            entities: EntityCollection::new(EntityKind::AccessPolicy, context),
        }
    }

    /// Creates a policy granting `permissions` for `duration`.
    ///
    /// The duration is sent in minutes, fractions included.
    pub async fn create_policy(
        &self,
        name: &str,
        duration: Duration,
        permissions: AccessPermissions,
    ) -> Result<RemoteEntity> {
        self.entities
            .create(fields([
                ("Name", json!(name)),
                ("DurationInMinutes", json!(duration.as_secs_f64() / 60.0)),
                ("Permissions", json!(permissions)),
            ]))
            .await
    }
}

impl Deref for AccessPolicyCollection {
    type Target = EntityCollection;

    fn deref(&self) -> &EntityCollection {
        &self.entities
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryService;

    #[tokio::test]
    async fn test_create_policy() {
        let service = InMemoryService::new();
        let context = service.context().expect("context");

        let policy = context
            .access_policies()
            .create_policy(
                "upload",
                Duration::from_secs(90 * 60),
                AccessPermissions::WRITE | AccessPermissions::LIST,
            )
            .await
            .expect("policy");

        assert!(policy.has_identity());
        assert_eq!(policy.attribute("DurationInMinutes"), Some(json!(90.0)));
        assert_eq!(policy.attribute("Permissions"), Some(json!(10)));
        assert_eq!(context.access_policies().list().await.expect("list").len(), 1);
    }
}
