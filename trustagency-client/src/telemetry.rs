//! Tracing subscriber setup.

use crate::config::GatewayConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub fn default_filter(config: &GatewayConfig) -> &'static str {
    if config.debug {
        "trustagency_client=debug"
    } else {
        "warn"
    }
}

/// Install a fmt subscriber. `RUST_LOG` wins over the config's `debug`
/// flag. Returns `false` when a global subscriber was already installed.
pub fn init_tracing(config: &GatewayConfig) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(config)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_flag_selects_filter() {
        let mut config = GatewayConfig::default();
        assert_eq!(default_filter(&config), "warn");
        config.debug = true;
        assert_eq!(default_filter(&config), "trustagency_client=debug");
    }

    #[test]
    fn repeated_init_is_harmless() {
        let config = GatewayConfig::default();
        init_tracing(&config);
        assert!(!init_tracing(&config));
    }
}
