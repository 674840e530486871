use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::models::AppConfig;

/// Default filter when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_FILTER: &str = "skyhaze=warn,dcp_engine=warn";

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `default_filter`. Returns `false` if a subscriber
/// was already installed, so embedding applications and tests can call this
/// more than once.
pub fn init_logging(default_filter: &str) -> bool {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .try_init()
        .is_ok()
}

/// Install the global tracing subscriber with the config's `log_filter`.
pub fn init_from_config(config: &AppConfig) -> bool {
    let installed = init_logging(&config.log_filter);
    if installed {
        tracing::debug!(filter = %config.log_filter, "Logging initialized");
    }
    installed
}
