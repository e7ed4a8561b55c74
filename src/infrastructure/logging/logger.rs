use crate::domain::models::config::{LogConfig, LogFormat, RotationPolicy};
use anyhow::Result;
use std::io;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Tracing-based logger for the daemon and CLI.
///
/// Holds the appender guard so buffered file output is flushed before
/// the process exits.
pub struct LoggerImpl {
    _guard: Option<WorkerGuard>,
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

impl LoggerImpl {
    /// Install the global subscriber for the given configuration.
    ///
    /// # Errors
    /// Returns an error if the configured level does not parse.
    pub fn init(config: &LogConfig) -> Result<Self> {
        let default_level = parse_log_level(&config.level)?;
        let filter = || {
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy()
        };

        let mut layers: Vec<BoxedLayer> = Vec::new();
        let mut guard = None;

        if let Some(ref log_dir) = config.log_dir {
            let file_appender = match config.rotation {
                RotationPolicy::Daily => rolling::daily(log_dir, "rota.log"),
                RotationPolicy::Hourly => rolling::hourly(log_dir, "rota.log"),
                RotationPolicy::Never => rolling::never(log_dir, "rota.log"),
            };
            let (writer, appender_guard) = tracing_appender::non_blocking(file_appender);
            guard = Some(appender_guard);

            // The file sink is always JSON; `format` shapes stdout only.
            layers.push(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(filter())
                    .boxed(),
            );
        }

        // Stdout stays on when no file sink is configured.
        if config.enable_stdout || config.log_dir.is_none() {
            let stdout = tracing_subscriber::fmt::layer().with_writer(io::stdout);
            layers.push(match config.format {
                LogFormat::Json => stdout
                    .json()
                    .with_current_span(true)
                    .with_target(true)
                    .with_filter(filter())
                    .boxed(),
                LogFormat::Pretty => stdout
                    .pretty()
                    .with_target(true)
                    .with_filter(filter())
                    .boxed(),
            });
        }

        tracing_subscriber::registry().with(layers).init();

        tracing::info!(
            level = %config.level,
            format = ?config.format,
            file_output = guard.is_some(),
            "logger initialized"
        );

        Ok(Self { _guard: guard })
    }
}

fn parse_log_level(level: &str) -> Result<Level> {
    level
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid log level: {level}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert!(matches!(parse_log_level("trace"), Ok(Level::TRACE)));
        assert!(matches!(parse_log_level("debug"), Ok(Level::DEBUG)));
        assert!(matches!(parse_log_level("info"), Ok(Level::INFO)));
        assert!(matches!(parse_log_level("warn"), Ok(Level::WARN)));
        assert!(matches!(parse_log_level("error"), Ok(Level::ERROR)));
        assert!(matches!(parse_log_level("WARN"), Ok(Level::WARN)));
        assert!(parse_log_level("verbose").is_err());
    }

    #[test]
    fn test_logger_init_stdout_only() {
        let config = LogConfig {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            log_dir: None,
            enable_stdout: true,
            rotation: RotationPolicy::Never,
        };

        // Note: This will initialize a global subscriber; keep this the
        // only init call in the unit-test binary.
        let result = LoggerImpl::init(&config);
        assert!(result.is_ok());
    }
}
