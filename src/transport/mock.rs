//! Mock transport implementation for testing.
//!
//! Replays scripted responses and records every request, so executor and
//! context behavior can be checked without a network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;

use super::traits::{Transport, TransportRequest};
use crate::Error;

/// Mock transport for testing.
///
/// Responses are consumed in order. When the script runs dry the mock
/// answers with the fallback response (`null` unless changed).
///
/// ## Example
///
/// ```rust
/// use cloudmedia::transport::MockTransport;
/// use serde_json::json;
///
/// let transport = MockTransport::new();
/// transport.push_response(json!({ "value": [] }));
/// transport.push_failure(503, "busy");
/// assert_eq!(transport.request_count(), 0);
/// ```
pub struct MockTransport {
    /// Scripted outcomes, consumed front to back.
    script: Mutex<VecDeque<Result<Value, Error>>>,
    /// Answer used once the script is empty.
    fallback: RwLock<Value>,
    /// Requests seen so far.
    requests: Mutex<Vec<TransportRequest>>,
    /// Request counter.
    request_count: AtomicU64,
}

impl MockTransport {
    /// Creates a new mock transport.
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: RwLock::new(Value::Null),
            requests: Mutex::new(Vec::new()),
            request_count: AtomicU64::new(0),
        }
    }

    /// Queues a successful response.
    pub fn push_response(&self, body: Value) {
        self.script.lock().push_back(Ok(body));
    }

    /// Queues a transport failure with the given HTTP status.
    pub fn push_failure(&self, status: u16, message: &str) {
        self.script
            .lock()
            .push_back(Err(Error::transport(message.to_string(), Some(status))));
    }

    /// Sets the response used once the script is empty.
    pub fn set_fallback(&self, body: Value) {
        *self.fallback.write() = body;
    }

    /// Returns the number of requests made.
    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Returns a copy of every request made so far.
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().clone()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("request_count", &self.request_count())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn issue(&self, request: TransportRequest) -> Result<Value, Error> {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        self.requests.lock().push(request);

        let scripted = self.script.lock().pop_front();
        match scripted {
            Some(outcome) => outcome,
            None => Ok(self.fallback.read().clone()),
        }
    }
}
