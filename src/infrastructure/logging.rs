//! Logging system configuration and initialization
//!
//! Console output by default, with an optional non-blocking file appender.
//! `RUST_LOG` overrides the configured level when set.

use anyhow::{anyhow, Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry,
};

use crate::infrastructure::config::LoggingConfig;

/// Initialize the logging system. The returned guard must be held for the
/// lifetime of the process when file output is enabled, otherwise buffered
/// log lines are lost on exit.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = Registry::default().with(env_filter);

    match (config.file_output, config.console_output) {
        (true, console) => {
            std::fs::create_dir_all(&config.log_dir).with_context(|| {
                format!("failed to create log directory {}", config.log_dir.display())
            })?;
            let file_appender = tracing_appender::rolling::never(&config.log_dir, "homescout.log");
            let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
            let file_layer = fmt::Layer::new()
                .with_writer(file_writer)
                .with_target(false)
                .with_ansi(false);

            if console {
                let console_layer = fmt::Layer::new()
                    .with_writer(std::io::stdout)
                    .with_target(false);
                registry.with(file_layer).with(console_layer).init();
            } else {
                registry.with(file_layer).init();
            }
            Ok(Some(guard))
        }
        (false, true) => {
            let console_layer = fmt::Layer::new()
                .with_writer(std::io::stdout)
                .with_target(false);
            registry.with(console_layer).init();
            Ok(None)
        }
        (false, false) => Err(anyhow!("no logging output configured")),
    }
}
