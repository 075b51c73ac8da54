use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::Layer;
use tracing_subscriber::prelude::*;

use super::filter::DebugOnlyFilter;
#[cfg(feature = "prod")]
use super::filter::ErrorOnlyFilter;
use super::filter::ErrorWarnFilter;
#[cfg(feature = "dev")]
use super::filter::InfoOnlyFilter;
use super::format::MuhaqqiqFormat;
use crate::Result;
use crate::config::LogRotation;
use crate::config::LoggingConfig;
use crate::error::ConfigError;

/// Flushes the non-blocking writers when dropped; hold it for the life of the process.
#[must_use]
pub struct TracingGuards {
    pub logs_dir: PathBuf,
    _guards: Vec<WorkerGuard>,
}

/// Installs the global subscriber: rolling debug and error files under
/// `logging.directory`, plus terminal output selected by the `dev`/`prod` features.
pub fn setup_tracing(
    engine_name: &str,
    logging: &LoggingConfig,
) -> Result<TracingGuards> {
    let base_logs_dir = logging.directory.as_path();
    let rotation = match logging.rotation {
        LogRotation::Hourly => Rotation::HOURLY,
        LogRotation::Daily => Rotation::DAILY,
        LogRotation::Never => Rotation::NEVER,
    };

    for dir in [base_logs_dir.to_path_buf(), base_logs_dir.join("debug"), base_logs_dir.join("error")] {
        std::fs::create_dir_all(&dir)
            .map_err(|e| ConfigError::OpenFileError(format!("{}: {}", dir.display(), e)))?;
    }

    let file_name = format!("{}.log", engine_name);
    let debug_appender = RollingFileAppender::new(rotation.clone(), base_logs_dir.join("debug"), &file_name);
    let error_appender = RollingFileAppender::new(rotation.clone(), base_logs_dir.join("error"), &file_name);
    #[cfg(feature = "dev")]
    let info_appender = RollingFileAppender::new(rotation, base_logs_dir, &file_name);

    let (non_blocking_debug, debug_guard) = tracing_appender::non_blocking(debug_appender);
    let (non_blocking_error, error_guard) = tracing_appender::non_blocking(error_appender);
    #[cfg(feature = "dev")]
    let (non_blocking_info, info_guard) = tracing_appender::non_blocking(info_appender);

    let format = MuhaqqiqFormat::new(engine_name, logging.source_location);

    let subscriber = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .event_format(format.clone())
                .with_writer(non_blocking_debug)
                .with_filter(DebugOnlyFilter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .event_format(format.clone())
                .with_writer(non_blocking_error)
                .with_filter(ErrorWarnFilter),
        );

    #[cfg(feature = "prod")]
    let subscriber = subscriber.with(
        tracing_subscriber::fmt::layer()
            .event_format(format.clone())
            .with_filter(ErrorOnlyFilter),
    );

    #[cfg(feature = "dev")]
    let subscriber = subscriber
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(format.clone())
                .with_filter(InfoOnlyFilter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .event_format(format)
                .with_writer(non_blocking_info)
                .with_filter(InfoOnlyFilter),
        );

    tracing::subscriber::set_global_default(subscriber)?;

    #[allow(unused_mut)]
    let mut guards = vec![debug_guard, error_guard];
    #[cfg(feature = "dev")]
    guards.push(info_guard);

    tracing::info!(
        "{}_logging_started::debug_logs::{}::error_logs::{}",
        engine_name,
        base_logs_dir.join("debug").display(),
        base_logs_dir.join("error").display()
    );

    Ok(TracingGuards {
        logs_dir: base_logs_dir.to_path_buf(),
        _guards: guards,
    })
}
