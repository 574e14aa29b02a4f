//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

use crate::config::BridgeConfig;

/// Install the global fmt subscriber
///
/// `RUST_LOG` wins over `config.log_level`. Returns `false` if a subscriber
/// was already installed, which leaves the existing one in place.
pub fn init(config: &BridgeConfig) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| build_filter(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|e| {
        eprintln!("Invalid log level '{}' ({}), falling back to info", level, e);
        EnvFilter::new("info")
    })
}
