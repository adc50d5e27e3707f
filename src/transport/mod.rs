//! Transport layer seam.
//!
//! The HTTP stack, OAuth token handling and wire encoding live outside this
//! crate. This module defines what the client needs from them:
//!
//! - [`Transport`]: issues an authenticated request and returns JSON
//! - [`VersionAdapter`]: supplies the protocol version header
//! - [`MockTransport`]: scripted in-memory transport for tests
//!
//! ## Example
//!
//! ```rust,ignore
//! struct HttpTransport { /* reqwest client, token cache */ }
//!
//! #[async_trait::async_trait]
//! impl Transport for HttpTransport {
//!     async fn issue(&self, request: TransportRequest) -> Result<Value, Error> {
//!         // send, map non-2xx to Error::transport(msg, Some(status))
//!     }
//! }
//! ```

pub(crate) mod mock;
pub(crate) mod traits;

pub use mock::MockTransport;
pub use traits::{Method, ServiceVersion, Transport, TransportRequest, VersionAdapter};
