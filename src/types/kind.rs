//! Resource kinds and their relation tables.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A named relation slot on an entity kind.
///
/// `inverse` names the derived collection on the target that lists entities
/// pointing at it through this relation (an asset's `Locators`). Creating a
/// link makes that collection stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    /// Relation name as used on the wire (`"Asset"`).
    pub name: &'static str,
    /// Kind the relation must point at.
    pub target: EntityKind,
    /// Derived collection on the target invalidated by a new link.
    pub inverse: Option<&'static str>,
}

const LOCATOR_RELATIONS: &[Relation] = &[
    Relation {
        name: "AccessPolicy",
        target: EntityKind::AccessPolicy,
        inverse: None,
    },
    Relation {
        name: "Asset",
        target: EntityKind::Asset,
        inverse: Some("Locators"),
    },
];

/// Kind of server-managed resource.
///
/// ```rust
/// use cloudmedia::types::EntityKind;
///
/// assert_eq!(EntityKind::Locator.entity_set(), "Locators");
/// let asset = EntityKind::Locator.relation("Asset").unwrap();
/// assert_eq!(asset.target, EntityKind::Asset);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    /// A media asset.
    Asset,
    /// A file belonging to an asset.
    AssetFile,
    /// Access policy governing locators.
    AccessPolicy,
    /// Content protection key.
    ContentKey,
    /// Processing job.
    Job,
    /// Reusable job template.
    JobTemplate,
    /// Notification endpoint for job events.
    NotificationEndPoint,
    /// Media processor.
    MediaProcessor,
    /// Locator granting access to an asset.
    Locator,
    /// Bulk ingest manifest.
    IngestManifest,
    /// Asset within an ingest manifest.
    IngestManifestAsset,
    /// File within an ingest manifest.
    IngestManifestFile,
    /// Storage account attached to the media account.
    StorageAccount,
}

impl EntityKind {
    /// Every kind, in declaration order.
    pub const ALL: [EntityKind; 13] = [
        EntityKind::Asset,
        EntityKind::AssetFile,
        EntityKind::AccessPolicy,
        EntityKind::ContentKey,
        EntityKind::Job,
        EntityKind::JobTemplate,
        EntityKind::NotificationEndPoint,
        EntityKind::MediaProcessor,
        EntityKind::Locator,
        EntityKind::IngestManifest,
        EntityKind::IngestManifestAsset,
        EntityKind::IngestManifestFile,
        EntityKind::StorageAccount,
    ];

    /// Entity set name addressing this kind on the service.
    pub fn entity_set(&self) -> &'static str {
        match self {
            EntityKind::Asset => "Assets",
            EntityKind::AssetFile => "Files",
            EntityKind::AccessPolicy => "AccessPolicies",
            EntityKind::ContentKey => "ContentKeys",
            EntityKind::Job => "Jobs",
            EntityKind::JobTemplate => "JobTemplates",
            EntityKind::NotificationEndPoint => "NotificationEndPoints",
            EntityKind::MediaProcessor => "MediaProcessors",
            EntityKind::Locator => "Locators",
            EntityKind::IngestManifest => "IngestManifests",
            EntityKind::IngestManifestAsset => "IngestManifestAssets",
            EntityKind::IngestManifestFile => "IngestManifestFiles",
            EntityKind::StorageAccount => "StorageAccounts",
        }
    }

    /// Relations an entity of this kind may be linked through.
    pub fn relations(&self) -> &'static [Relation] {
        match self {
            EntityKind::Locator => LOCATOR_RELATIONS,
            _ => &[],
        }
    }

    /// Looks up a relation by name.
    pub fn relation(&self, name: &str) -> Option<&'static Relation> {
        self.relations().iter().find(|r| r.name == name)
    }

    /// Resolves a derived collection on this kind to the kind it lists.
    ///
    /// `Asset` + `"Locators"` resolves to `Locator`.
    pub fn navigation_target(&self, navigation: &str) -> Option<EntityKind> {
        Self::ALL.into_iter().find(|source| {
            source
                .relations()
                .iter()
                .any(|r| r.target == *self && r.inverse == Some(navigation))
        })
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.entity_set())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_sets_are_unique() {
        let mut sets: Vec<_> = EntityKind::ALL.iter().map(|k| k.entity_set()).collect();
        sets.sort_unstable();
        sets.dedup();
        assert_eq!(sets.len(), EntityKind::ALL.len());
    }

    #[test]
    fn test_locator_relations() {
        let relations = EntityKind::Locator.relations();
        assert_eq!(relations.len(), 2);
        assert_eq!(relations[0].name, "AccessPolicy");
        assert_eq!(relations[1].inverse, Some("Locators"));
        assert!(EntityKind::Asset.relations().is_empty());
        assert!(EntityKind::Locator.relation("Job").is_none());
    }

    #[test]
    fn test_navigation_target() {
        assert_eq!(
            EntityKind::Asset.navigation_target("Locators"),
            Some(EntityKind::Locator)
        );
        assert_eq!(EntityKind::AccessPolicy.navigation_target("Locators"), None);
        assert_eq!(EntityKind::Asset.navigation_target("Files"), None);
    }

    #[test]
    fn test_display_uses_entity_set() {
        assert_eq!(EntityKind::StorageAccount.to_string(), "StorageAccounts");
    }
}
