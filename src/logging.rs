use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_DIR: &str = "logs";
const LOG_FILE: &str = "clinic_directory.log";
const DEFAULT_DIRECTIVE: &str = "clinic_directory=info";

/// Initializes the logging system with console output and, optionally, a JSON log file.
///
/// The returned guard flushes the file writer when dropped, so the caller keeps it
/// alive for the whole run.
pub fn init_logging(log_to_file: bool) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    // Create a non-blocking file appender for daily log rotation
    let (file_layer, guard) = if log_to_file {
        let _ = fs::create_dir_all(LOG_DIR);
        let file_appender = tracing_appender::rolling::daily(LOG_DIR, LOG_FILE);
        let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);
        (Some(fmt::layer().json().with_writer(non_blocking_writer)), Some(guard))
    } else {
        (None, None)
    };

    // Console output goes to stderr so `export` can stream JSON on stdout
    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_only_logging_has_no_guard() {
        assert!(init_logging(false).is_none());
        tracing::info!("console logging ready");
    }
}
