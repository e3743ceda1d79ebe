//! Tracing initialization.

use tracing_subscriber::EnvFilter;

/// Logs to stderr so stdout stays clean for results. `RUST_LOG` overrides
/// the default `info` level.
pub fn init(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).compact();
    if let Err(e) = builder.try_init() {
        eprintln!("Failed to initialize tracing: {}", e)
    }
}
