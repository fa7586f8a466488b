//! Diagnostic tracing for the gateway, version writer and orchestration.
//!
//! User-facing output goes through `ui::formatter`; tracing is for
//! diagnosing git and manifest operations and writes to stderr only.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`. Defaults to `warn`, or `debug` with `verbose`.
/// Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=git_flow=trace git-flow support-start --start-commit v1.2.0
/// ```
pub fn init(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // A second init (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}
