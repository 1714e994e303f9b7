//! Monitoring API client

use weaver_models::DeviceStatusEntry;

use crate::errors::ConsoleError;
use crate::http::client::HttpClient;

impl HttpClient {
    /// Reachability of every managed device
    pub async fn monitoring_status(&self) -> Result<Vec<DeviceStatusEntry>, ConsoleError> {
        self.get("/monitoring/status").await
    }
}
