//! API models

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Bearer token issued by `POST /auth/token`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// A managed RouterOS device as returned by the inventory endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: i64,
    pub name: String,
    pub ip_address: String,
    pub username: String,
    #[serde(default)]
    pub vpn_ip: Option<String>,
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    #[serde(default = "default_snmp_community")]
    pub snmp_community: String,
}

/// Device creation request body
///
/// The password travels only in this transient body; callers keep it wrapped
/// until the moment of submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceCreate {
    pub name: String,
    pub ip_address: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    #[serde(default = "default_snmp_community")]
    pub snmp_community: String,
}

fn default_api_port() -> u16 {
    8728
}

fn default_snmp_community() -> String {
    "public".to_string()
}

/// Reachability as reported by `GET /monitoring/status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LinkStatus {
    Up,
    Down,
}

/// One row of the monitoring status array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStatusEntry {
    pub id: i64,
    pub name: String,
    pub ip_address: String,
    pub status: LinkStatus,
}

/// Deployment request for `POST /config/deploy`
///
/// For the `custom` template the raw command string is carried in
/// `template_name` and `params` stays empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigRequest {
    pub device_id: i64,
    pub template_name: String,
    pub params: BTreeMap<String, String>,
}

/// Deployment outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigResponse {
    pub status: String,
    pub message: String,
}

/// Durable deployment audit record from `GET /config/history`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigHistoryEntry {
    pub log_id: i64,
    pub device_id: i64,
    pub timestamp: NaiveDateTime,
    pub action_type: String,
    pub status: String,
    pub details: String,
}

/// Catalog row from `GET /routeros/scripts/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptInfo {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Result of a script execution or connectivity probe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    pub status: String,
    pub message: String,
}

/// Raw RouterOS `/system/resource` counters for one device
///
/// RouterOS reports every counter as a string; parsing into numbers is the
/// console's job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceMetrics {
    #[serde(rename = "cpu-load", default)]
    pub cpu_load: Option<String>,
    #[serde(rename = "total-memory", default)]
    pub total_memory: Option<String>,
    #[serde(rename = "free-memory", default)]
    pub free_memory: Option<String>,
    #[serde(rename = "total-hdd-space", default)]
    pub total_hdd_space: Option<String>,
    #[serde(rename = "free-hdd-space", default)]
    pub free_hdd_space: Option<String>,
    #[serde(default)]
    pub uptime: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(rename = "board-name", default)]
    pub board_name: Option<String>,
}

/// Severity attached to an activity log entry by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl ActivityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Info => "info",
            ActivityLevel::Success => "success",
            ActivityLevel::Warning => "warning",
            ActivityLevel::Error => "error",
        }
    }
}

/// One row of `GET /logs/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    pub id: i64,
    pub timestamp: NaiveDateTime,
    pub level: ActivityLevel,
    pub device: String,
    pub action: String,
    pub message: String,
}
