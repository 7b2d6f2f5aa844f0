//! Logging setup.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Build the filter: `RUST_LOG` when set, otherwise `level` for this crate
/// and `warn` for dependencies.
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,thread_sentiment={}", level)))
}

/// Initialize the global subscriber, writing to stderr.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(level: &str) {
    let console_layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    let result = Registry::default()
        .with(env_filter(level))
        .with(console_layer)
        .try_init();

    if result.is_ok() {
        tracing::debug!(level, "logging initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_twice_does_not_panic() {
        init_logging("debug");
        init_logging("info");
    }
}
