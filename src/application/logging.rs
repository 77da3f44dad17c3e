//! # Logging Setup
//!
//! Installs the global `tracing` subscriber: stdout always, plus a plain-text file sink
//! when `log_file` is configured. `RUST_LOG` overrides the level chosen by `debug`.

use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Default filter directive for the `debug` setting.
pub fn default_directive(debug: bool) -> &'static str {
    if debug { "debug,hyper=info,reqwest=info" } else { "info,hyper=warn,reqwest=warn" }
}

/// Initializes logging. Keep the returned guard alive so buffered file output is flushed.
pub fn init(debug: bool, log_file: Option<&str>) -> Result<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let path = Path::new(path);
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .with_context(|| format!("log_file has no file name: {}", path.display()))?;
            std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

            let file_appender = tracing_appender::rolling::never(dir, name);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}
