//! Configuration types for the cloudmedia client.
//!
//! This module provides configuration options for:
//! - [`RetryConfig`]: Retry behavior for transient failures
//! - [`TransferConfig`]: Limits for content transfers

mod retry;
mod transfer;

pub use retry::RetryConfig;
pub use transfer::TransferConfig;
