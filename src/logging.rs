use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber: `RUST_LOG` wins, `info` otherwise.
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let result = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false))
        .try_init();
    if let Err(err) = result {
        tracing::debug!(%err, "tracing subscriber already installed");
    }
}
