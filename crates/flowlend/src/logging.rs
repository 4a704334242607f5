use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;

/// Filter used when `RUST_LOG` is unset: this crate at the configured level,
/// everything else at `warn`.
pub fn default_directive(logging: &LoggingConfig) -> String {
    format!("{}={},warn", env!("CARGO_CRATE_NAME"), logging.level)
}

/// Install the global subscriber: a JSON layer to a daily rolling file and a
/// stderr layer (compact, or JSON when `json_stderr` is set).
///
/// The returned [`WorkerGuard`] flushes the file writer on drop; hold it for
/// the lifetime of the process.
pub fn init_tracing(logging: &LoggingConfig) -> Result<WorkerGuard> {
    std::fs::create_dir_all(&logging.log_dir)
        .with_context(|| format!("failed to create log dir {}", logging.log_dir))?;

    let file_appender = tracing_appender::rolling::daily(&logging.log_dir, &logging.file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive(logging))
            .with_context(|| format!("invalid logging.level {:?}", logging.level))?,
    };

    let stderr_layer = if logging.json_stderr {
        fmt::layer().with_writer(std::io::stderr).json().boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .compact()
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .json(),
        )
        .with(stderr_layer)
        .init();

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logging(level: &str) -> LoggingConfig {
        LoggingConfig {
            log_dir: "logs".into(),
            file_name: "flowlend.log".into(),
            level: level.into(),
            json_stderr: false,
        }
    }

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(&logging("debug")), "flowlend=debug,warn");
    }

    #[test]
    fn test_default_directive_parses() {
        assert!(EnvFilter::try_new(default_directive(&logging("info"))).is_ok());
    }
}
