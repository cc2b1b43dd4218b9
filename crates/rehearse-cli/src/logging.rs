//! Log subscriber setup

use crate::config::{LogFormat, Verbosity};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter from `RUST_LOG`, falling back to the verbosity default
#[must_use]
pub fn env_filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()))
}

/// Install the global subscriber, writing to stderr.
///
/// A second call is a no-op so tests can initialise freely.
pub fn init_logging(verbosity: Verbosity, format: LogFormat) {
    let registry = tracing_subscriber::registry().with(env_filter(verbosity));
    let result = match format {
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
    if result.is_err() {
        tracing::debug!("log subscriber already installed");
    }
}
