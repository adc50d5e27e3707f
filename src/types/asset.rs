//! Asset creation values.

use serde::{Deserialize, Serialize};

/// Encryption applied to an asset's content at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum AssetOptions {
    /// Stored in the clear.
    #[default]
    None,
    /// Encrypted at rest with a per-asset storage key.
    StorageEncrypted,
    /// Protected with common encryption for streaming.
    CommonEncryptionProtected,
    /// Protected with envelope encryption for streaming.
    EnvelopeEncryptionProtected,
}

impl From<AssetOptions> for u32 {
    fn from(value: AssetOptions) -> Self {
        match value {
            AssetOptions::None => 0,
            AssetOptions::StorageEncrypted => 1,
            AssetOptions::CommonEncryptionProtected => 2,
            AssetOptions::EnvelopeEncryptionProtected => 4,
        }
    }
}

impl TryFrom<u32> for AssetOptions {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AssetOptions::None),
            1 => Ok(AssetOptions::StorageEncrypted),
            2 => Ok(AssetOptions::CommonEncryptionProtected),
            4 => Ok(AssetOptions::EnvelopeEncryptionProtected),
            other => Err(format!("unknown asset options {}", other)),
        }
    }
}
