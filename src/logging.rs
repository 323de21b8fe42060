use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{
    config::Config,
    error::{AppError, AppResult},
};

pub const LOG_FILE_NAME: &str = "hydrate-tracker.log";

/// Installs the global subscriber. Keep the returned guard alive until exit
/// or buffered file logs are lost.
pub fn init(config: &Config, data_dir: &Path, verbose: bool) -> AppResult<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|error| AppError::Config(format!("log_level: {error}")))?;

    let (file_layer, guard) = if config.log_to_file {
        let log_dir = data_dir.join("logs");
        std::fs::create_dir_all(&log_dir)?;
        let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        (Some(fmt::layer().json().with_writer(writer)), Some(guard))
    } else {
        (None, None)
    };

    let stderr_layer = verbose.then(|| fmt::layer().with_writer(std::io::stderr));
    let sentry_layer = config
        .sentry_dsn
        .is_some()
        .then(sentry::integrations::tracing::layer);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .with(sentry_layer)
        .try_init()
        .map_err(|error| AppError::Config(error.to_string()))?;

    Ok(guard)
}

/// Starts error reporting when a DSN is configured.
pub fn init_sentry(config: &Config) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
