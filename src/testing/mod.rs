//! Testing utilities for cloudmedia.
//!
//! - [`InMemoryService`]: an in-memory media service implementing the query
//!   and save executors, with scripted failures
//! - [`MockTransport`](crate::transport::MockTransport): a scripted transport
//!   for exercising the transport-backed executors
//!
//! ## Quick Start
//!
//! ```rust
//! use cloudmedia::testing::InMemoryService;
//! use cloudmedia::types::{EntityKind, LocatorType};
//! use serde_json::json;
//!
//! # async fn demo() -> cloudmedia::Result<()> {
//! let service = InMemoryService::new();
//! let asset = service.seed(EntityKind::Asset, json!({ "Name": "movie" }));
//! let policy = service.seed(EntityKind::AccessPolicy, json!({ "Name": "read" }));
//!
//! let context = service.context()?;
//! let locator = context
//!     .locators()
//!     .create_locator(LocatorType::Sas, &asset, &policy, None)
//!     .await?;
//! assert!(locator.has_identity());
//! # Ok(())
//! # }
//! ```

mod in_memory;

pub use in_memory::InMemoryService;
