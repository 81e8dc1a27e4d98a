use std::fs;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes the logging system with console and file output.
pub fn init_logging() {
    let _ = fs::create_dir_all("logs");

    // Daily-rotating JSON log for post-run inspection
    let file_appender = tracing_appender::rolling::daily("logs", "relayer-sync.log");
    let (non_blocking_writer, _guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);

    // Console output stays human-readable; progress lines go to stdout separately
    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("relayer_sync=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    // Keep the guard alive so buffered file logs are flushed on exit
    std::mem::forget(_guard);
}
