//! Observability setup.
//!
//! Structured logging through `tracing`, filtered by `RUST_LOG` (default
//! `info`) and written to stderr as text or JSON.

use crate::config::LogFormat;
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
pub fn init_tracing(format: LogFormat) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false);

    match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
}

/// Route panics through tracing so they reach the same log sink.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let message = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "<non-string panic payload>".to_string());
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_default();
        tracing::error!(
            panic.message = %message,
            panic.location = %location,
            "PANIC occurred\n{}",
            std::backtrace::Backtrace::capture()
        );
    }));
}
