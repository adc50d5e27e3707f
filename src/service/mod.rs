//! Service collaborators: queries, save batches and the executors that run
//! them.
//!
//! A [`ServiceFactory`] hands out one [`QueryExecutor`] and one
//! [`SaveExecutor`]. The default factory issues both through the context's
//! [`Transport`](crate::transport::Transport); tests substitute an in-memory
//! service.

mod batch;
mod executor;
mod query;
mod traits;

pub use batch::{EntityKey, SaveBatch, SaveOperation, SaveResult};
pub use executor::{DefaultServiceFactory, TransportQueryExecutor, TransportSaveExecutor};
pub use query::{Query, QueryScope};
pub use traits::{QueryExecutor, SaveExecutor, ServiceFactory};
