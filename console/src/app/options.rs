//! Runtime options
//!
//! Settings come from the settings file; command-line flags override
//! individual fields for one run.

use std::path::PathBuf;

use crate::logs::{LogLevel, LogOptions};
use crate::storage::settings::Settings;

/// Effective options for one console run
#[derive(Debug, Clone)]
pub struct AppOptions {
    pub settings: Settings,
    pub base_dir: Option<PathBuf>,
}

impl AppOptions {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            base_dir: None,
        }
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.settings.backend.base_url = base_url.to_string();
        self
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.settings.log_level = level;
        self
    }

    /// Logging options derived from the settings; the log directory is
    /// filled in by the runner once the layout exists.
    pub fn log_options(&self, log_dir: Option<PathBuf>) -> LogOptions {
        LogOptions {
            log_level: self.settings.log_level.clone(),
            stderr: true,
            log_dir: if self.settings.file_logging {
                log_dir
            } else {
                None
            },
            json_format: false,
        }
    }
}
