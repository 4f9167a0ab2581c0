//! Logging setup shared by the command line tools.

use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// The filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Install the global tracing subscriber.
///
/// Log lines go to stderr so that a command's report on stdout can be piped
/// on its own. The level is read from `RUST_LOG` and defaults to
/// [DEFAULT_LOG_FILTER].
///
/// # Panics
/// Panics if a global subscriber has already been installed.
pub fn setup_logging() {
    let stderr_log = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(stderr_log.with_filter(env_filter()))
        .init();
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}
