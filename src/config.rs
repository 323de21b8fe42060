use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use tracing::debug;

use crate::{
    error::{AppError, AppResult},
    storage::{default_data_dir, project_dirs},
    tracker::TrackerOptions,
};

pub const CONFIG_FILE_NAME: &str = "config.json";

/// One week
pub const MAX_REMINDER_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Where the store and logs live, platform data dir when unset
    pub data_dir: Option<PathBuf>,

    /// Filter used when `RUST_LOG` is not set
    pub log_level: String,

    pub log_to_file: bool,

    pub sentry_dsn: Option<String>,

    pub reminder_interval_minutes: u64,

    pub celebration_seconds: u64,

    /// What the desktop notifier answers when asked for permission
    pub notifications_allowed: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            log_level: "info".to_string(),
            log_to_file: true,
            sentry_dsn: None,
            reminder_interval_minutes: 120,
            celebration_seconds: 5,
            notifications_allowed: true,
        }
    }
}

impl Config {
    /// Reads `path`, or the platform config file when `None`. A missing file
    /// yields the defaults; a malformed one is an error.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => project_dirs()?.config_dir().join(CONFIG_FILE_NAME),
        };

        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(error) => return Err(error.into()),
        };

        let config: Self = serde_json::from_str(&raw)
            .map_err(|error| AppError::Config(format!("{}: {error}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        if !(1..=MAX_REMINDER_INTERVAL_MINUTES).contains(&self.reminder_interval_minutes) {
            return Err(AppError::Config(format!(
                "reminder_interval_minutes must be between 1 and {MAX_REMINDER_INTERVAL_MINUTES}"
            )));
        }
        Ok(())
    }

    pub fn data_dir(&self) -> AppResult<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_data_dir(),
        }
    }

    pub fn tracker_options(&self) -> AppResult<TrackerOptions> {
        let interval_secs = self
            .reminder_interval_minutes
            .checked_mul(60)
            .ok_or_else(|| AppError::Config("reminder_interval_minutes is too large".into()))?;

        Ok(TrackerOptions {
            reminder_interval: Duration::from_secs(interval_secs),
            celebration: Duration::from_secs(self.celebration_seconds),
        })
    }
}
