//! Transport and version adapter contracts.
//!
//! The transport adapter owns authentication and the HTTP stack; the client
//! only hands it fully-addressed requests and reads JSON back.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::Error;

// ============================================================================
// Request
// ============================================================================

/// HTTP verb of a transport request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Read.
    Get,
    /// Create or batch.
    Post,
    /// Partial update.
    Merge,
    /// Delete.
    Delete,
}

impl Method {
    /// Returns the verb as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Merge => "MERGE",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request handed to the transport adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    /// HTTP verb.
    pub method: Method,
    /// Absolute resource URL.
    pub url: Url,
    /// Extra headers (protocol version and the like).
    pub headers: Vec<(String, String)>,
    /// JSON body, if any.
    pub body: Option<Value>,
}

impl TransportRequest {
    /// Creates a request without headers or body.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Sets the JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Returns the value of a header, if present.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

// ============================================================================
// Adapters
// ============================================================================

/// Authenticated transport to the remote service.
///
/// Implementations supply credentials and report failures as
/// [`ErrorKind::Transport`](crate::ErrorKind::Transport) errors carrying the
/// HTTP status, so that fault classifiers can reach it.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues a request and returns the decoded JSON response body.
    ///
    /// An empty response body is returned as [`Value::Null`].
    async fn issue(&self, request: TransportRequest) -> Result<Value, Error>;
}

/// Supplies the protocol version header sent with every request.
pub trait VersionAdapter: Send + Sync {
    /// Header name.
    fn header_name(&self) -> &str;

    /// Header value.
    fn header_value(&self) -> &str;

    /// Adds the version header to a request.
    fn apply(&self, request: &mut TransportRequest) {
        request
            .headers
            .push((self.header_name().to_string(), self.header_value().to_string()));
    }
}

/// Fixed protocol version.
///
/// ```rust
/// use cloudmedia::transport::{ServiceVersion, VersionAdapter};
///
/// let version = ServiceVersion::default();
/// assert_eq!(version.header_name(), "x-ms-version");
/// assert_eq!(version.header_value(), ServiceVersion::CURRENT);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceVersion {
    value: String,
}

impl ServiceVersion {
    /// Version spoken by this client unless told otherwise.
    pub const CURRENT: &'static str = "2.11";

    /// Header carrying the version.
    pub const HEADER: &'static str = "x-ms-version";

    /// Creates a version adapter for the given value.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl Default for ServiceVersion {
    fn default() -> Self {
        Self::new(Self::CURRENT)
    }
}

impl VersionAdapter for ServiceVersion {
    fn header_name(&self) -> &str {
        Self::HEADER
    }

    fn header_value(&self) -> &str {
        &self.value
    }
}
