//! Prelude module for convenient imports.
//!
//! ```rust
//! use cloudmedia::prelude::*;
//! ```
//!
//! This provides access to:
//! - The context and its collections
//! - Error types
//! - Retry configuration and cancellation
//! - Common entity types

pub use std::sync::Arc;
pub use std::time::Duration;

pub use crate::{
    collections::{
        AccessPolicyCollection, AssetCollection, EntityCollection, LocatorCollection,
        StorageAccountCollection,
    },
    config::{RetryConfig, TransferConfig},
    context::MediaContext,
    error::{Error, ErrorKind, Result},
    retry::{CancellationToken, RetryPolicy},
    save::LinkReference,
    transport::{ServiceVersion, Transport, TransportRequest},
    types::{AccessPermissions, AssetOptions, EntityKind, LocatorType, RemoteEntity},
};
