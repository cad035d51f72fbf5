//! File logging built on the `log` facade and `fern`.

use anyhow::{Context, Result};
use chrono::Utc;
use log::LevelFilter;
use std::path::PathBuf;

use crate::config::LoggingConfig;
use crate::constants::{APP_DIR_NAME, LOG_FILE_NAME};

/// Installs the process-wide logger from configuration.
pub struct Logger;

impl Logger {
    /// Install the global logger. Does nothing when logging is disabled.
    ///
    /// Fails if the log file cannot be opened or a logger is already installed.
    pub fn init(config: &LoggingConfig) -> Result<()> {
        if !config.enabled {
            return Ok(());
        }

        Self::dispatch(config)?
            .apply()
            .context("A global logger is already installed")?;
        Ok(())
    }

    /// Build the dispatcher without installing it.
    pub fn dispatch(config: &LoggingConfig) -> Result<fern::Dispatch> {
        let level = Self::level(config)?;
        let path = match &config.file {
            Some(path) => path.clone(),
            None => Self::get_log_file_path()?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
            }
        }

        let file = fern::log_file(&path).with_context(|| format!("Failed to open log file: {}", path.display()))?;

        Ok(fern::Dispatch::new()
            .format(|out, message, record| {
                out.finish(format_args!(
                    "[{} {:<5} {}] {}",
                    Utc::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                    record.level(),
                    record.target(),
                    message
                ))
            })
            .level(level)
            // sqlx logs every statement at info
            .level_for("sqlx", LevelFilter::Warn)
            .level_for("sea_orm", LevelFilter::Warn)
            .chain(file))
    }

    /// Parse the configured level
    pub fn level(config: &LoggingConfig) -> Result<LevelFilter> {
        config
            .level
            .parse::<LevelFilter>()
            .map_err(|_| anyhow::anyhow!("Invalid log level: {}", config.level))
    }

    /// Default log file location under the user's data directory
    pub fn get_log_file_path() -> Result<PathBuf> {
        dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))
            .map(|dir| dir.join(APP_DIR_NAME).join(LOG_FILE_NAME))
    }
}
