//! Synchronous entry points over the async API.

use std::future::Future;

use crate::error::{Error, Result};

/// Drives `future` to completion on a private current-thread runtime.
///
/// Panics if called from within an async runtime, like any nested
/// `block_on`.
pub(crate) fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::configuration("failed to start blocking runtime").with_source(e))?;
    Ok(runtime.block_on(future))
}
