use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggerConfig;

const DEFAULT_FILTER: &str = "info,sqlx=warn";

/// Installs the global subscriber. Config level beats `RUST_LOG`.
pub fn init(config: &LoggerConfig) {
    let level = config
        .level()
        .map(|lvl| lvl.to_string())
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string());

    let filter = EnvFilter::try_new(&level).unwrap_or_else(|err| {
        eprintln!("invalid log filter {level:?}: {err}, falling back to {DEFAULT_FILTER}");
        EnvFilter::new(DEFAULT_FILTER)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
