//! Logging setup
//!
//! Logs go to stderr through `tracing-subscriber`. `RUST_LOG` selects the
//! filter; without it, `info` and above are shown.
//!
//! ```ignore
//! commander::observability::init_logging();
//! tracing::info!(id = 1, "command created");
//! ```

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid
pub const DEFAULT_FILTER: &str = "info";

/// Build the filter from `RUST_LOG`, falling back to [`DEFAULT_FILTER`]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber
///
/// Returns `false` if a subscriber was already installed, which happens when
/// the CLI is driven more than once in the same process.
pub fn init_logging() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}
