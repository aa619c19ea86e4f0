use anyhow::Result;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::LoggingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Effective filter directive and format: `RUST_LOG` / `LOG_FORMAT` over the settings file
pub fn resolve(
    config: &LoggingConfig,
    rust_log: Option<String>,
    log_format: Option<String>,
) -> (String, LogFormat) {
    let level = rust_log
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| config.level.clone());
    let format = log_format.unwrap_or_else(|| config.format.clone());
    (level, LogFormat::parse(&format))
}

/// Stdout plus a daily file `{directory}/{file_prefix}.YYYY-MM-DD.log`.
/// Keep the returned guard alive for the life of the process; dropping it
/// flushes and stops the file writer.
pub fn init_logger(config: &LoggingConfig) -> Result<WorkerGuard> {
    let (level, format) = resolve(
        config,
        std::env::var("RUST_LOG").ok(),
        std::env::var("LOG_FORMAT").ok(),
    );

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(&config.file_prefix)
        .filename_suffix("log")
        .build(&config.directory)?;
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_new(&level)?;
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stdout)
                    .with_thread_ids(true),
            )
            .with(fmt::layer().json().with_writer(file_writer))
            .try_init()?,
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_writer(std::io::stdout))
            .with(fmt::layer().with_writer(file_writer).with_ansi(false))
            .try_init()?,
    }

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    fn config() -> LoggingConfig {
        Settings::defaults().unwrap().logging
    }

    #[test]
    fn test_settings_used_without_env() {
        let (level, format) = resolve(&config(), None, None);
        assert_eq!(level, "info,mcp_chat_server=debug");
        assert_eq!(format, LogFormat::Pretty);
    }

    #[test]
    fn test_env_overrides_settings() {
        let (level, format) = resolve(&config(), Some("warn".into()), Some("JSON".into()));
        assert_eq!(level, "warn");
        assert_eq!(format, LogFormat::Json);
    }

    #[test]
    fn test_blank_rust_log_is_ignored() {
        let (level, _) = resolve(&config(), Some("  ".into()), None);
        assert_eq!(level, "info,mcp_chat_server=debug");
    }
}
