//! Tracing subscriber installation for plugin hosts.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::HostConfig;

/// Build the filter: `RUST_LOG` when set and valid, otherwise the config's
/// `log_filter`, otherwise `info`.
#[must_use]
pub fn env_filter(config: &HostConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global fmt subscriber described by `config`.
///
/// Returns `false` when a global subscriber was already installed, in which
/// case the existing one is left in place.
pub fn init_tracing(config: &HostConfig) -> bool {
    let builder = fmt()
        .with_env_filter(env_filter(config))
        .with_target(true)
        .with_thread_ids(false);

    let installed = if config.log_json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.is_ok()
}
