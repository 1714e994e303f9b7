//! Shared test double for the backend API

// Each test binary uses a different subset of the fake
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use weaver_models::{
    ActionResult, ActivityLogEntry, ConfigHistoryEntry, ConfigRequest, ConfigResponse, Device,
    DeviceCreate, DeviceStatusEntry, ResourceMetrics, ScriptInfo, TokenResponse,
};

use confweaver::errors::ConsoleError;
use confweaver::http::ConsoleApi;

type Scripted<T> = Mutex<VecDeque<Result<T, ConsoleError>>>;

fn pop<T>(queue: &Scripted<T>) -> Result<T, ConsoleError> {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Err(ConsoleError::Internal("no scripted response".to_string())))
}

/// Backend double with scripted responses and recorded requests.
///
/// Responses are consumed front to back; an exhausted queue yields an
/// internal error so a test that over-calls fails loudly.
#[derive(Default)]
pub struct FakeApi {
    pub login_responses: Scripted<TokenResponse>,
    pub devices_responses: Scripted<Vec<Device>>,
    pub create_responses: Scripted<Device>,
    pub delete_responses: Scripted<()>,
    pub status_responses: Scripted<Vec<DeviceStatusEntry>>,
    pub deploy_responses: Scripted<ConfigResponse>,
    pub history_responses: Scripted<Vec<ConfigHistoryEntry>>,
    pub scripts_responses: Scripted<Vec<ScriptInfo>>,
    pub execute_responses: Scripted<ActionResult>,
    pub metrics_responses: Scripted<ResourceMetrics>,
    pub logs_responses: Scripted<Vec<ActivityLogEntry>>,
    pub probe_responses: Scripted<ActionResult>,

    pub login_requests: Mutex<Vec<(String, String)>>,
    pub create_requests: Mutex<Vec<(DeviceCreate, bool)>>,
    pub delete_requests: Mutex<Vec<i64>>,
    pub deploy_requests: Mutex<Vec<ConfigRequest>>,
    pub execute_requests: Mutex<Vec<(i64, String)>>,
}

#[allow(dead_code)]
impl FakeApi {
    pub fn device(id: i64, name: &str) -> Device {
        Device {
            id,
            name: name.to_string(),
            ip_address: format!("10.0.0.{}", id),
            username: "admin".to_string(),
            vpn_ip: None,
            api_port: 8728,
            snmp_community: "public".to_string(),
        }
    }

    pub fn api_error(status: u16, detail: &str) -> ConsoleError {
        ConsoleError::ApiError {
            status,
            detail: detail.to_string(),
        }
    }
}

#[async_trait]
impl ConsoleApi for FakeApi {
    async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<TokenResponse, ConsoleError> {
        self.login_requests
            .lock()
            .unwrap()
            .push((username.to_string(), password.expose_secret().to_string()));
        pop(&self.login_responses)
    }

    async fn list_devices(&self) -> Result<Vec<Device>, ConsoleError> {
        pop(&self.devices_responses)
    }

    async fn create_device(
        &self,
        device: &DeviceCreate,
        validate_connectivity: bool,
    ) -> Result<Device, ConsoleError> {
        self.create_requests
            .lock()
            .unwrap()
            .push((device.clone(), validate_connectivity));
        pop(&self.create_responses)
    }

    async fn delete_device(&self, device_id: i64) -> Result<(), ConsoleError> {
        self.delete_requests.lock().unwrap().push(device_id);
        pop(&self.delete_responses)
    }

    async fn monitoring_status(&self) -> Result<Vec<DeviceStatusEntry>, ConsoleError> {
        pop(&self.status_responses)
    }

    async fn deploy_config(&self, request: &ConfigRequest) -> Result<ConfigResponse, ConsoleError> {
        self.deploy_requests.lock().unwrap().push(request.clone());
        pop(&self.deploy_responses)
    }

    async fn config_history(&self) -> Result<Vec<ConfigHistoryEntry>, ConsoleError> {
        pop(&self.history_responses)
    }

    async fn list_scripts(&self) -> Result<Vec<ScriptInfo>, ConsoleError> {
        pop(&self.scripts_responses)
    }

    async fn execute_script(
        &self,
        device_id: i64,
        script_name: &str,
    ) -> Result<ActionResult, ConsoleError> {
        self.execute_requests
            .lock()
            .unwrap()
            .push((device_id, script_name.to_string()));
        pop(&self.execute_responses)
    }

    async fn resource_metrics(&self, _device_id: i64) -> Result<ResourceMetrics, ConsoleError> {
        pop(&self.metrics_responses)
    }

    async fn activity_logs(&self) -> Result<Vec<ActivityLogEntry>, ConsoleError> {
        pop(&self.logs_responses)
    }

    async fn test_connection(&self, _device_id: i64) -> Result<ActionResult, ConsoleError> {
        pop(&self.probe_responses)
    }
}
