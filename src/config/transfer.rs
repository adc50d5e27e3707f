//! Transfer settings shared by upload and download helpers.
//!
//! The context carries these settings so that any content-transfer component
//! built on top of it uses the same limits.
//!
//! ## Example
//!
//! ```rust
//! use cloudmedia::TransferConfig;
//!
//! let config = TransferConfig::builder()
//!     .parallel_transfer_threads(16)
//!     .concurrent_transfers(4)
//!     .build();
//! assert_eq!(config.get_parallel_transfer_threads(), 16);
//! ```

/// Limits for content transfers issued through a context.
#[derive(Debug, Clone, bon::Builder)]
pub struct TransferConfig {
    /// Number of threads used to move the blocks of a single file.
    #[builder(default = 10)]
    parallel_transfer_threads: u32,

    /// Number of files transferred at the same time.
    #[builder(default = 2)]
    concurrent_transfers: u32,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl TransferConfig {
    /// Returns the number of threads per file transfer.
    pub fn get_parallel_transfer_threads(&self) -> u32 {
        self.parallel_transfer_threads
    }

    /// Returns the number of simultaneous file transfers.
    pub fn get_concurrent_transfers(&self) -> u32 {
        self.concurrent_transfers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TransferConfig::default();
        assert_eq!(config.get_parallel_transfer_threads(), 10);
        assert_eq!(config.get_concurrent_transfers(), 2);
    }

    #[test]
    fn test_builder_overrides() {
        let config = TransferConfig::builder().concurrent_transfers(8).build();
        assert_eq!(config.get_parallel_transfer_threads(), 10);
        assert_eq!(config.get_concurrent_transfers(), 8);
    }
}
