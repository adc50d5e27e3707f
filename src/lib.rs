//! # cloudmedia
//!
//! Resilient entity access and linked saves for a cloud media service.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cloudmedia::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), cloudmedia::Error> {
//!     let context = MediaContext::builder()
//!         .transport(Arc::new(HttpTransport::new(token_source)))
//!         .retry_config(RetryConfig::new().with_max_attempts(5))
//!         .build()?;
//!
//!     let asset = context.assets().create_asset("movie", AssetOptions::None).await?;
//!     let policy = context
//!         .access_policies()
//!         .create_policy("read-1h", Duration::from_secs(3600), AccessPermissions::READ)
//!         .await?;
//!
//!     let locator = context.locators().create_sas_locator(&asset, &policy, None).await?;
//!     println!("locator {:?}", locator.id());
//!     Ok(())
//! }
//! ```
//!
//! ## Key Concepts
//!
//! - **Context**: [`MediaContext`] owns one lazily built collection per
//!   resource kind; clones share everything
//! - **Linked save**: a new entity and its links to existing ones are
//!   committed in one atomic transaction
//! - **Fault classification**: failed remote calls are retried only when
//!   the originating failure carries a retryable HTTP status
//!   (408, 429, 500, 502, 503, 504)
//!
//! ## Features
//!
//! - `blocking`: synchronous forms of the linked-save operations

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

// Core modules
pub mod collections;
pub mod config;
pub mod context;
pub mod error;
pub mod retry;
pub mod save;
pub mod service;
pub mod types;

// Transport layer
pub mod transport;

// Testing utilities
pub mod testing;

// Prelude for convenient imports
pub mod prelude;

#[cfg(feature = "blocking")]
mod blocking;
mod user_agent;

// Re-export main types at crate root for convenience
pub use config::{RetryConfig, TransferConfig};
pub use context::{ContextBuilder, EntityHandle, MediaContext, WeakContext};
pub use error::{Error, ErrorKind, Result};
pub use retry::{CancellationToken, FaultClassification, FaultClassifier, RetryPolicy};
pub use save::{LinkReference, LinkedSaveWorkflow, SaveTransaction};
pub use types::{
    AccessPermissions, AssetOptions, EntityKind, EntityRecord, LocatorType, RemoteEntity,
};
pub use user_agent::user_agent;
