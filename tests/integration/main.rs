//! Integration tests for the cloudmedia client.
//!
//! These tests drive the public API end to end against
//! [`InMemoryService`](cloudmedia::testing::InMemoryService) and
//! [`MockTransport`](cloudmedia::transport::MockTransport); no network is
//! involved.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test integration
//!
//! # With client logs
//! RUST_LOG=cloudmedia=debug cargo test --test integration -- --nocapture
//! ```

mod common;
mod context_tests;
mod linked_save_tests;
mod retry_tests;
mod transport_tests;
