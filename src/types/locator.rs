//! Locator and access policy value types.

use std::ops::BitOr;

use serde::{Deserialize, Serialize};

/// Kind of access a locator grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum LocatorType {
    /// No locator type.
    #[default]
    None,
    /// Shared access signature URL to the asset's storage container.
    Sas,
    /// Streaming origin URL.
    OnDemandOrigin,
}

impl From<LocatorType> for i32 {
    fn from(value: LocatorType) -> Self {
        match value {
            LocatorType::None => 0,
            LocatorType::Sas => 1,
            LocatorType::OnDemandOrigin => 2,
        }
    }
}

impl TryFrom<i32> for LocatorType {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(LocatorType::None),
            1 => Ok(LocatorType::Sas),
            2 => Ok(LocatorType::OnDemandOrigin),
            other => Err(format!("unknown locator type {}", other)),
        }
    }
}

/// Operations an access policy permits, combinable with `|`.
///
/// ```rust
/// use cloudmedia::types::AccessPermissions;
///
/// let rw = AccessPermissions::READ | AccessPermissions::WRITE;
/// assert!(rw.contains(AccessPermissions::READ));
/// assert!(!rw.contains(AccessPermissions::DELETE));
/// assert_eq!(rw.bits(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessPermissions(u32);

impl AccessPermissions {
    /// No access.
    pub const NONE: Self = Self(0);
    /// Read content.
    pub const READ: Self = Self(1);
    /// Write content.
    pub const WRITE: Self = Self(2);
    /// Delete content.
    pub const DELETE: Self = Self(4);
    /// List content.
    pub const LIST: Self = Self(8);

    /// Returns the raw bit set.
    pub fn bits(&self) -> u32 {
        self.0
    }

    /// Returns `true` if every permission in `other` is granted.
    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for AccessPermissions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}
