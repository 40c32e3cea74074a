//! Structured logging bootstrap for binaries and tests that embed the registry.

use std::sync::OnceLock;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub const ENV_LOG_FILTER: &str = "FEED_REGISTRY_LOG";

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Install a console subscriber filtered by `FEED_REGISTRY_LOG`, then `RUST_LOG`,
/// then `info`. Safe to call repeatedly; an existing global subscriber wins.
pub fn init_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let directives = log_filter(|key| std::env::var(key).ok());
        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_filter(EnvFilter::new(directives.clone())),
        );

        if subscriber.try_init().is_err() {
            tracing::debug!("global tracing subscriber already set, keeping it");
        }

        tracing::info!(filter = %directives, "feed registry logging initialized");
    });
}

fn log_filter(lookup: impl Fn(&str) -> Option<String>) -> String {
    let set = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
    set(ENV_LOG_FILTER)
        .or_else(|| set("RUST_LOG"))
        .unwrap_or_else(|| "info".to_string())
}
