use std::path::Path;

use anyhow::{Context, Result};
use time::macros::format_description;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_error::ErrorLayer;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Console logging, plus a plain-text log file when `log_file` is given.
/// Keep the returned guard alive until exit so the file writer flushes.
pub fn init_logger(log_level: String, log_file: Option<String>) -> Result<Option<WorkerGuard>> {
    let timer = LocalTime::new(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ));
    let filter = EnvFilter::try_new(&log_level)
        .with_context(|| format!("Invalid log level: {}", log_level))?;

    let console = fmt::layer()
        .with_timer(timer.clone())
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match log_file {
        Some(log_file) => {
            let path = Path::new(&log_file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let name = path.file_name().context("Log file has no file name")?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_timer(timer)
                .with_ansi(false)
                .with_writer(non_blocking);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .with(ErrorLayer::default())
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}
