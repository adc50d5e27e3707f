//! Executors issuing queries and save batches through a [`Transport`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::{Query, QueryExecutor, SaveBatch, SaveExecutor, SaveResult, ServiceFactory};
use crate::error::{Error, Result};
use crate::transport::{Method, Transport, TransportRequest, VersionAdapter};
use crate::types::EntityRecord;
use crate::user_agent;

/// Path of the batch endpoint, relative to the service root.
const BATCH_PATH: &str = "$batch";

#[derive(Deserialize)]
#[serde(untagged)]
enum Feed {
    Wrapped { value: Vec<EntityRecord> },
    Bare(Vec<EntityRecord>),
}

#[derive(Deserialize)]
struct BatchResponse {
    #[serde(default)]
    results: Vec<SaveResult>,
}

/// Shared plumbing: service root, transport and version header.
#[derive(Clone)]
struct Endpoint {
    root: Url,
    transport: Arc<dyn Transport>,
    version: Arc<dyn VersionAdapter>,
}

impl Endpoint {
    fn request(&self, method: Method, path: &str) -> Result<TransportRequest> {
        let url = self.root.join(path)?;
        let mut request =
            TransportRequest::new(method, url).with_header(user_agent::HEADER, user_agent::user_agent());
        self.version.apply(&mut request);
        Ok(request)
    }
}

/// Wraps a transport failure in an origin error, copying its status.
fn wrap_failure(origin: Error, cause: Error) -> Error {
    match cause.status_code() {
        Some(status) => origin.with_status(status).with_source(cause),
        None => origin.with_source(cause),
    }
}

/// Runs queries as `GET` requests against the entity set paths.
#[derive(Clone)]
pub struct TransportQueryExecutor {
    endpoint: Endpoint,
}

impl TransportQueryExecutor {
    /// Creates a query executor rooted at `root`.
    pub fn new(root: Url, transport: Arc<dyn Transport>, version: Arc<dyn VersionAdapter>) -> Self {
        Self {
            endpoint: Endpoint {
                root,
                transport,
                version,
            },
        }
    }
}

#[async_trait]
impl QueryExecutor for TransportQueryExecutor {
    async fn execute(&self, query: &Query) -> Result<Vec<EntityRecord>> {
        let path = query.path();
        let request = self.endpoint.request(Method::Get, &path)?;

        let body = self
            .endpoint
            .transport
            .issue(request)
            .await
            .map_err(|e| wrap_failure(Error::query_execution(format!("query {} failed", path)), e))?;

        if query.expects_single() {
            let record: EntityRecord = serde_json::from_value(body)?;
            return Ok(vec![record]);
        }

        match serde_json::from_value::<Feed>(body)? {
            Feed::Wrapped { value } | Feed::Bare(value) => Ok(value),
        }
    }
}

/// Commits save batches as one `POST` to the batch endpoint.
#[derive(Clone)]
pub struct TransportSaveExecutor {
    endpoint: Endpoint,
}

impl TransportSaveExecutor {
    /// Creates a save executor rooted at `root`.
    pub fn new(root: Url, transport: Arc<dyn Transport>, version: Arc<dyn VersionAdapter>) -> Self {
        Self {
            endpoint: Endpoint {
                root,
                transport,
                version,
            },
        }
    }
}

#[async_trait]
impl SaveExecutor for TransportSaveExecutor {
    async fn save(&self, batch: &SaveBatch) -> Result<Vec<SaveResult>> {
        let request = self
            .endpoint
            .request(Method::Post, BATCH_PATH)?
            .with_body(serde_json::to_value(batch)?);

        let body = self
            .endpoint
            .transport
            .issue(request)
            .await
            .map_err(|e| {
                wrap_failure(
                    Error::save_execution(format!("batch {} failed", batch.batch_id)),
                    e,
                )
            })?;

        if body.is_null() {
            return Ok(Vec::new());
        }
        let response: BatchResponse = serde_json::from_value(body)?;
        Ok(response.results)
    }
}

/// Factory handing out transport-backed executors.
///
/// This is what a context uses unless a custom factory was supplied.
#[derive(Clone)]
pub struct DefaultServiceFactory {
    query: Arc<TransportQueryExecutor>,
    save: Arc<TransportSaveExecutor>,
}

impl DefaultServiceFactory {
    /// Creates executors sharing one transport and version adapter.
    pub fn new(root: Url, transport: Arc<dyn Transport>, version: Arc<dyn VersionAdapter>) -> Self {
        Self {
            query: Arc::new(TransportQueryExecutor::new(
                root.clone(),
                Arc::clone(&transport),
                Arc::clone(&version),
            )),
            save: Arc::new(TransportSaveExecutor::new(root, transport, version)),
        }
    }
}

impl ServiceFactory for DefaultServiceFactory {
    fn query_executor(&self) -> Arc<dyn QueryExecutor> {
        self.query.clone()
    }

    fn save_executor(&self) -> Arc<dyn SaveExecutor> {
        self.save.clone()
    }
}

impl std::fmt::Debug for DefaultServiceFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultServiceFactory")
            .field("root", &self.query.endpoint.root.as_str())
            .finish_non_exhaustive()
    }
}
