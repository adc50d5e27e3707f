//! Save batches: the accumulated operations of one save transaction.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::types::EntityKind;

/// How an operation addresses an entity inside a batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "key", rename_all = "camelCase")]
pub enum EntityKey {
    /// An entity the service already knows.
    Existing {
        /// Entity kind.
        kind: EntityKind,
        /// Server identity.
        id: String,
    },
    /// An entity created by this batch, addressed by its content id.
    New {
        /// Position-independent handle assigned when the entity was added.
        content_id: u32,
    },
}

/// One pending operation, applied in batch order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum SaveOperation {
    /// Make an existing entity addressable by identity without resending it.
    Attach {
        /// Entity kind.
        kind: EntityKind,
        /// Server identity.
        id: String,
    },
    /// Create a new entity.
    Add {
        /// Handle used by later operations in the batch.
        content_id: u32,
        /// Entity kind.
        kind: EntityKind,
        /// Scalar attributes to create it with.
        attributes: Map<String, Value>,
    },
    /// Point a relation slot of `source` at `target`.
    SetLink {
        /// Entity owning the slot.
        source: EntityKey,
        /// Relation name.
        relation: String,
        /// Entity the slot points at.
        target: EntityKey,
    },
}

/// Operations committed together; all succeed or the whole batch fails.
///
/// `batch_id` is generated once per transaction and resent unchanged on
/// every retry, so an executor can recognize a batch it already applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveBatch {
    /// Client-generated idempotency key.
    pub batch_id: Uuid,
    /// Operations in issue order.
    pub operations: Vec<SaveOperation>,
}

/// Per-entity outcome of a committed batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveResult {
    /// Content id of the created entity.
    pub content_id: u32,
    /// Identity the service assigned.
    pub id: String,
    /// Server-computed attributes (paths, timestamps).
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operation_wire_shape() {
        let op = SaveOperation::SetLink {
            source: EntityKey::New { content_id: 1 },
            relation: "Asset".into(),
            target: EntityKey::Existing {
                kind: EntityKind::Asset,
                id: "a1".into(),
            },
        };
        let value = serde_json::to_value(&op).expect("serialize");
        assert_eq!(value["op"], json!("setLink"));
        assert_eq!(value["source"]["key"], json!("new"));
        assert_eq!(value["target"]["id"], json!("a1"));
    }

    #[test]
    fn test_result_attributes_default() {
        let result: SaveResult =
            serde_json::from_value(json!({ "content_id": 1, "id": "l1" })).expect("parse");
        assert!(result.attributes.is_empty());
    }
}
