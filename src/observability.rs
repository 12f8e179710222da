//! Logging and observability helpers.

pub mod sensitive;

pub use sensitive::{redact_properties, RedactedUrl};

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, PerfConfig};

const DEFAULT_FILTER: &str = "qoredb_perf=info,qore_driver_api=info";

/// Installs a global stderr subscriber.
///
/// `RUST_LOG` overrides the default filter. Does nothing if the host
/// application already installed a subscriber.
pub fn init_tracing(config: &PerfConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_target(true);

    let installed = match config.log_format {
        LogFormat::Json => builder
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .try_init(),
        LogFormat::Text => builder.try_init(),
    };

    if installed.is_ok() {
        tracing::info!(format = ?config.log_format, "Tracing initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_idempotent() {
        let config = PerfConfig::default();
        init_tracing(&config);
        init_tracing(&config);
    }
}
