//! Logging setup for the binary.

use tracing_subscriber::EnvFilter;

/// Install a global `tracing` subscriber writing to stderr.
///
/// `RUST_LOG` takes precedence; otherwise the level is `info`, or `debug`
/// when `verbose` is set.
pub fn init(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);

    // A subscriber may already be installed by an embedding test harness.
    let _ = if json { builder.json().try_init() } else { builder.try_init() };
}
