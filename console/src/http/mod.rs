//! Backend HTTP surface
//!
//! One inherent-method file per backend resource, unified behind the
//! [`ConsoleApi`] trait so views and the poll scheduler can run against a
//! fake in tests.

pub mod activity;
pub mod auth;
pub mod client;
pub mod config;
pub mod devices;
pub mod monitoring;
pub mod routeros;

use async_trait::async_trait;
use secrecy::SecretString;
use weaver_models::{
    ActionResult, ActivityLogEntry, ConfigHistoryEntry, ConfigRequest, ConfigResponse, Device,
    DeviceCreate, DeviceStatusEntry, ResourceMetrics, ScriptInfo, TokenResponse,
};

use crate::errors::ConsoleError;
use crate::http::client::HttpClient;

/// Domain API consumed by the views and the poll scheduler
#[async_trait]
pub trait ConsoleApi: Send + Sync {
    async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<TokenResponse, ConsoleError>;

    async fn list_devices(&self) -> Result<Vec<Device>, ConsoleError>;

    async fn create_device(
        &self,
        device: &DeviceCreate,
        validate_connectivity: bool,
    ) -> Result<Device, ConsoleError>;

    async fn delete_device(&self, device_id: i64) -> Result<(), ConsoleError>;

    async fn monitoring_status(&self) -> Result<Vec<DeviceStatusEntry>, ConsoleError>;

    async fn deploy_config(&self, request: &ConfigRequest) -> Result<ConfigResponse, ConsoleError>;

    async fn config_history(&self) -> Result<Vec<ConfigHistoryEntry>, ConsoleError>;

    async fn list_scripts(&self) -> Result<Vec<ScriptInfo>, ConsoleError>;

    async fn execute_script(
        &self,
        device_id: i64,
        script_name: &str,
    ) -> Result<ActionResult, ConsoleError>;

    async fn resource_metrics(&self, device_id: i64) -> Result<ResourceMetrics, ConsoleError>;

    async fn activity_logs(&self) -> Result<Vec<ActivityLogEntry>, ConsoleError>;

    async fn test_connection(&self, device_id: i64) -> Result<ActionResult, ConsoleError>;
}

#[async_trait]
impl ConsoleApi for HttpClient {
    async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<TokenResponse, ConsoleError> {
        HttpClient::login(self, username, password).await
    }

    async fn list_devices(&self) -> Result<Vec<Device>, ConsoleError> {
        HttpClient::list_devices(self).await
    }

    async fn create_device(
        &self,
        device: &DeviceCreate,
        validate_connectivity: bool,
    ) -> Result<Device, ConsoleError> {
        HttpClient::create_device(self, device, validate_connectivity).await
    }

    async fn delete_device(&self, device_id: i64) -> Result<(), ConsoleError> {
        HttpClient::delete_device(self, device_id).await
    }

    async fn monitoring_status(&self) -> Result<Vec<DeviceStatusEntry>, ConsoleError> {
        HttpClient::monitoring_status(self).await
    }

    async fn deploy_config(&self, request: &ConfigRequest) -> Result<ConfigResponse, ConsoleError> {
        HttpClient::deploy_config(self, request).await
    }

    async fn config_history(&self) -> Result<Vec<ConfigHistoryEntry>, ConsoleError> {
        HttpClient::config_history(self).await
    }

    async fn list_scripts(&self) -> Result<Vec<ScriptInfo>, ConsoleError> {
        HttpClient::list_scripts(self).await
    }

    async fn execute_script(
        &self,
        device_id: i64,
        script_name: &str,
    ) -> Result<ActionResult, ConsoleError> {
        HttpClient::execute_script(self, device_id, script_name).await
    }

    async fn resource_metrics(&self, device_id: i64) -> Result<ResourceMetrics, ConsoleError> {
        HttpClient::resource_metrics(self, device_id).await
    }

    async fn activity_logs(&self) -> Result<Vec<ActivityLogEntry>, ConsoleError> {
        HttpClient::activity_logs(self).await
    }

    async fn test_connection(&self, device_id: i64) -> Result<ActionResult, ConsoleError> {
        HttpClient::test_connection(self, device_id).await
    }
}
