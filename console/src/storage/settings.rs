//! Settings file management

use serde::{Deserialize, Serialize};

use crate::logs::LogLevel;

/// Console settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Write logs to a file under the layout's logs dir
    #[serde(default)]
    pub file_logging: bool,

    /// Backend configuration
    #[serde(default)]
    pub backend: BackendSettings,

    /// Polling intervals
    #[serde(default)]
    pub polling: PollingSettings,

    /// Toast visibility duration in seconds
    #[serde(default = "default_toast_secs")]
    pub toast_duration_secs: u64,

    /// External Grafana dashboard URL, shown on the monitoring view.
    /// The dashboards themselves are outside this console's control.
    #[serde(default)]
    pub grafana_url: Option<String>,
}

fn default_toast_secs() -> u64 {
    5
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            file_logging: false,
            backend: BackendSettings::default(),
            polling: PollingSettings::default(),
            toast_duration_secs: default_toast_secs(),
            grafana_url: None,
        }
    }
}

/// Backend API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Base URL for the backend API
    #[serde(default = "default_backend_url")]
    pub base_url: String,
}

fn default_backend_url() -> String {
    "http://localhost:8000".to_string()
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
        }
    }
}

/// Polling intervals per resource, in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingSettings {
    #[serde(default = "default_status_interval")]
    pub status_interval_secs: u64,

    #[serde(default = "default_metrics_interval")]
    pub metrics_interval_secs: u64,

    #[serde(default = "default_logs_interval")]
    pub logs_interval_secs: u64,

    #[serde(default = "default_history_interval")]
    pub history_interval_secs: u64,
}

fn default_status_interval() -> u64 {
    30
}

fn default_metrics_interval() -> u64 {
    15
}

fn default_logs_interval() -> u64 {
    30
}

fn default_history_interval() -> u64 {
    5
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            status_interval_secs: default_status_interval(),
            metrics_interval_secs: default_metrics_interval(),
            logs_interval_secs: default_logs_interval(),
            history_interval_secs: default_history_interval(),
        }
    }
}
