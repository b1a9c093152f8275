//! Tracing bootstrap for the binary.

use std::env;

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,photoswipe=debug";

/// Installs the global subscriber. Filter precedence: `RUST_LOG`, then
/// `PHOTOSWIPE_LOG`, then [`DEFAULT_FILTER`].
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_target(true)
        .with_thread_names(true)
        .with_env_filter(filter_from_env())
        .try_init();
}

fn filter_from_env() -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let custom = env::var("PHOTOSWIPE_LOG")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .and_then(|value| EnvFilter::try_new(value).ok());
    if let Some(filter) = custom {
        return filter;
    }

    EnvFilter::new(DEFAULT_FILTER)
}
