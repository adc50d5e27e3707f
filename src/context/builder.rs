//! Context builder with typestate pattern.

use std::{marker::PhantomData, sync::Arc};

use url::Url;

use super::inner::ContextInner;
use crate::{
    Error, MediaContext,
    config::{RetryConfig, TransferConfig},
    service::ServiceFactory,
    transport::{ServiceVersion, Transport, VersionAdapter},
};

/// Service root used when no URL is given.
pub const DEFAULT_API_SERVER: &str = "https://media.windows.net/";

/// Marker type: transport not yet provided.
pub struct NoTransport;

/// Marker type: transport has been provided.
pub struct HasTransport;

/// Builder for creating [`MediaContext`] instances.
///
/// Uses the typestate pattern so a context cannot be built without a
/// transport.
///
/// ## Required Configuration
///
/// - `transport()`: Authenticated transport to the service
///
/// ## Optional Configuration
///
/// - `url()`: Service root (default [`DEFAULT_API_SERVER`])
/// - `version()`: Version header adapter (default [`ServiceVersion`])
/// - `retry_config()`: Retry behavior for transient failures
/// - `transfer_config()`: Content transfer limits
/// - `service_factory()`: Replacement query and save executors
///
/// ## Example
///
/// ```rust
/// use std::sync::Arc;
/// use cloudmedia::{MediaContext, RetryConfig};
/// use cloudmedia::transport::MockTransport;
///
/// let context = MediaContext::builder()
///     .url("https://media.example.net/api/")
///     .transport(Arc::new(MockTransport::new()))
///     .retry_config(RetryConfig::new().with_max_attempts(5))
///     .build()?;
/// assert_eq!(context.api_server().as_str(), "https://media.example.net/api/");
/// # Ok::<(), cloudmedia::Error>(())
/// ```
pub struct ContextBuilder<TransportState> {
    url: Option<String>,
    transport: Option<Arc<dyn Transport>>,
    version: Option<Arc<dyn VersionAdapter>>,
    retry_config: RetryConfig,
    transfer_config: TransferConfig,
    service_factory: Option<Arc<dyn ServiceFactory>>,
    _transport_state: PhantomData<TransportState>,
}

impl ContextBuilder<NoTransport> {
    /// Creates a new context builder.
    pub fn new() -> Self {
        Self {
            url: None,
            transport: None,
            version: None,
            retry_config: RetryConfig::default(),
            transfer_config: TransferConfig::default(),
            service_factory: None,
            _transport_state: PhantomData,
        }
    }

    /// Sets the transport every request goes through.
    pub fn transport(self, transport: Arc<dyn Transport>) -> ContextBuilder<HasTransport> {
        ContextBuilder {
            url: self.url,
            transport: Some(transport),
            version: self.version,
            retry_config: self.retry_config,
            transfer_config: self.transfer_config,
            service_factory: self.service_factory,
            _transport_state: PhantomData,
        }
    }
}

impl Default for ContextBuilder<NoTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ContextBuilder<T> {
    /// Sets the service root.
    ///
    /// A trailing `/` is added if missing so entity set paths join below it.
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the version header adapter.
    #[must_use]
    pub fn version(mut self, version: Arc<dyn VersionAdapter>) -> Self {
        self.version = Some(version);
        self
    }

    /// Sets the retry configuration used for queries and saves.
    #[must_use]
    pub fn retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// Sets the content transfer limits.
    #[must_use]
    pub fn transfer_config(mut self, config: TransferConfig) -> Self {
        self.transfer_config = config;
        self
    }

    /// Replaces the transport-backed query and save executors.
    #[must_use]
    pub fn service_factory(mut self, factory: Arc<dyn ServiceFactory>) -> Self {
        self.service_factory = Some(factory);
        self
    }
}

impl ContextBuilder<HasTransport> {
    /// Builds the context.
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if the URL does not parse or is not
    /// an `http`/`https` URL.
    pub fn build(self) -> Result<MediaContext, Error> {
        let api_server = parse_api_server(self.url.as_deref().unwrap_or(DEFAULT_API_SERVER))?;

        let transport = self
            .transport
            .ok_or_else(|| Error::configuration("transport is required"))?;
        let version = self
            .version
            .unwrap_or_else(|| Arc::new(ServiceVersion::default()));

        tracing::debug!(api_server = %api_server, "building media context");

        Ok(MediaContext::from_inner(ContextInner::new(
            api_server,
            transport,
            version,
            self.retry_config,
            self.transfer_config,
            self.service_factory,
        )))
    }
}

fn parse_api_server(raw: &str) -> Result<Url, Error> {
    let mut url = Url::parse(raw)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::configuration(format!(
            "unsupported scheme '{}' for api server",
            url.scheme()
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
