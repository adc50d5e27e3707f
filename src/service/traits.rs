//! Query and save collaborator contracts.

use std::sync::Arc;

use async_trait::async_trait;

use super::{Query, SaveBatch, SaveResult};
use crate::error::Result;
use crate::types::EntityRecord;

/// Executes reads against a resource collection.
///
/// Failures are reported as
/// [`ErrorKind::QueryExecution`](crate::ErrorKind::QueryExecution) errors
/// wrapping the transport failure, with the HTTP status copied onto the
/// query error.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Runs the query and returns the matching records.
    async fn execute(&self, query: &Query) -> Result<Vec<EntityRecord>>;
}

/// Commits save batches.
///
/// Failures are reported as
/// [`ErrorKind::SaveExecution`](crate::ErrorKind::SaveExecution) errors
/// wrapping the transport failure, with the HTTP status copied onto the save
/// error. A batch is applied atomically or not at all.
#[async_trait]
pub trait SaveExecutor: Send + Sync {
    /// Commits the batch and returns one result per created entity.
    async fn save(&self, batch: &SaveBatch) -> Result<Vec<SaveResult>>;
}

/// Produces the executors a context talks to the service through.
pub trait ServiceFactory: Send + Sync {
    /// Executor for reads.
    fn query_executor(&self) -> Arc<dyn QueryExecutor>;

    /// Executor for save transactions.
    fn save_executor(&self) -> Arc<dyn SaveExecutor>;
}
