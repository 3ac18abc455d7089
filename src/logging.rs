//! Tracing setup for the `fxq` binary.
//!
//! Logs go to stderr so stdout only ever carries the result line.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `level` (from config or `--verbose`)
/// is used, falling back to `warn` if it doesn't parse. Calling this twice is
/// harmless.
pub fn init(level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let registry = tracing_subscriber::registry().with(env_filter);
    let _ = tracing::subscriber::set_global_default(registry.with(fmt::layer().with_writer(std::io::stderr)));
}
