//! Error types for the cloudmedia client.
//!
//! Every fallible operation returns [`Error`], categorized by [`ErrorKind`].
//!
//! ## Key Invariant
//!
//! Wrapping never loses information: a terminal error such as
//! `RetryExhausted` or `PermanentRemote` always carries the original
//! collaborator failure as its [`source()`](std::error::Error::source), so the
//! root condition stays reachable.
//!
//! ```rust,ignore
//! match ctx.locators().create_sas_locator(&asset, &policy, None).await {
//!     Ok(locator) => println!("created {:?}", locator.id()),
//!     Err(e) if e.kind() == ErrorKind::RetryExhausted => eprintln!("gave up: {e}"),
//!     Err(e) => return Err(e),
//! }
//! ```

mod core;
mod kind;

pub use core::Error;
pub use kind::ErrorKind;

/// A specialized `Result` type for cloudmedia operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
