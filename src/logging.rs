//! Logger initialization
//!
//! Wires the `log` facade to `env_logger`. The filter comes from the explicit
//! configuration first, then `RUST_LOG`, then falls back to `info`.

use std::sync::Once;

/// Crates whose logs are capped at `warn` unless the filter mentions them.
const NOISY_CRATES: [&str; 3] = ["wgpu_core", "wgpu_hal", "naga"];

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "evergreen=debug,wgpu_core=warn").
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// Subsequent calls are ignored, so tests and binaries can both call it.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(log::LevelFilter::Info);

        let filter = config
            .env_filter
            .or_else(|| std::env::var("RUST_LOG").ok());

        for krate in NOISY_CRATES {
            let mentioned = filter.as_deref().is_some_and(|f| f.contains(krate));
            if !mentioned {
                builder.filter_module(krate, log::LevelFilter::Warn);
            }
        }

        if let Some(filter) = filter.as_deref() {
            builder.parse_filters(filter);
        }

        builder.write_style(config.write_style);

        if builder.try_init().is_err() {
            // Another logger was installed first (e.g. by a test harness).
            return;
        }

        log::debug!("logging initialized");
    });
}
