//! Logging setup for the weigh binary.
//!
//! Diagnostics go to stderr so they never mix with command output.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging at the level implied by a `-v` count
///
/// 0 → warn, 1 → info, 2 → debug, 3+ → trace. `RUST_LOG` still wins when set.
pub fn init_for_verbosity(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    init_with_level(level)
}

/// Initialize logging with a specific default level
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

/// Initialize logging for testing (captures logs for test output)
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
