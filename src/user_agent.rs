//! User-Agent header sent with every service request.

use std::sync::OnceLock;

/// Client name used in the User-Agent string.
const CLIENT_NAME: &str = "cloudmedia";

/// Client version from Cargo.toml.
const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Header carrying the User-Agent.
pub(crate) const HEADER: &str = "User-Agent";

static USER_AGENT: OnceLock<String> = OnceLock::new();

/// Returns the User-Agent string, computed once.
///
/// Format: `cloudmedia/0.1.0 (rust/1.92; linux/x86_64)`
pub fn user_agent() -> &'static str {
    USER_AGENT.get_or_init(|| {
        format!(
            "{}/{} ({}; {}/{})",
            CLIENT_NAME,
            CLIENT_VERSION,
            concat!("rust/", env!("CARGO_PKG_RUST_VERSION")),
            os_name(),
            std::env::consts::ARCH,
        )
    })
}

fn os_name() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        os => os,
    }
}
