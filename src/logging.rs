use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

/// Environment variable holding an `EnvFilter` directive that overrides
/// `logging.filter`.
pub const LOG_ENV: &str = "STDIO_GUARD_LOG";

/// Build the filter: `STDIO_GUARD_LOG` wins, then the configured directive,
/// then "warn" if the configured directive does not parse.
pub fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Initialize tracing for the binary.
///
/// Logs go to stderr unless `log_file` is configured. Stderr is read once
/// per event, so while stderr is redirected the events land in the
/// redirect target; a log file avoids that.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = build_filter(config);

    let Some(log_path) = config.log_file.as_ref() else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .init();
        return;
    };

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    {
        Ok(file) => file,
        Err(err) => {
            eprintln!(
                "Warning: Failed to open log file {}: {}",
                log_path.display(),
                err
            );
            return;
        }
    };

    let file_layer = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .init();
}
