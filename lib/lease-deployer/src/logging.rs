//! Log output setup shared by the binaries.
use tracing_subscriber::{fmt, EnvFilter};

/// Installs a global subscriber printing to stderr.
///
/// `filter` uses the `EnvFilter` directive syntax, e.g. `info` or
/// `lease_deployer=debug,warn`. An invalid directive falls back to `info`.
/// Later calls are ignored, so tests may call this repeatedly.
pub fn init(filter: &str) {
    let filter = EnvFilter::try_new(filter)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // Fails only when a subscriber is already installed.
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
