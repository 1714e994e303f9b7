//! RouterOS-specific API client: scripts, metrics, connectivity probes

use weaver_models::{ActionResult, ResourceMetrics, ScriptInfo};

use crate::errors::ConsoleError;
use crate::http::client::HttpClient;

impl HttpClient {
    /// List the server-side RouterOS script catalog
    pub async fn list_scripts(&self) -> Result<Vec<ScriptInfo>, ConsoleError> {
        self.get("/routeros/scripts/").await
    }

    /// Execute a named script on a device
    pub async fn execute_script(
        &self,
        device_id: i64,
        script_name: &str,
    ) -> Result<ActionResult, ConsoleError> {
        // script_name travels as a query parameter, not a body
        let encoded: String = url::form_urlencoded::byte_serialize(script_name.as_bytes()).collect();
        self.post_empty(&format!(
            "/routeros/scripts/execute/{}?script_name={}",
            device_id, encoded
        ))
        .await
    }

    /// Raw `/system/resource` counters for one device
    pub async fn resource_metrics(&self, device_id: i64) -> Result<ResourceMetrics, ConsoleError> {
        self.get(&format!("/routeros/metrics/resources/{}", device_id))
            .await
    }

    /// Probe API connectivity to a device
    pub async fn test_connection(&self, device_id: i64) -> Result<ActionResult, ConsoleError> {
        self.post_empty(&format!("/routeros/devices/{}/test_connection", device_id))
            .await
    }
}
