//! Core types for the cloudmedia client.
//!
//! - [`EntityKind`]: Resource kinds and their relation tables
//! - [`RemoteEntity`]: Shared handle to a server-managed resource
//! - [`EntityRecord`]: Wire form of an entity
//! - [`LocatorType`], [`AccessPermissions`]: Locator provisioning values
//! - [`AssetOptions`]: Asset encryption at creation

mod asset;
mod entity;
mod kind;
mod locator;

pub use asset::AssetOptions;
pub use entity::{EntityRecord, RemoteEntity};
pub use kind::{EntityKind, Relation};
pub use locator::{AccessPermissions, LocatorType};
