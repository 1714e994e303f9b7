//! Configuration deployment API client

use weaver_models::{ConfigHistoryEntry, ConfigRequest, ConfigResponse};

use crate::errors::ConsoleError;
use crate::http::client::HttpClient;

impl HttpClient {
    /// Deploy a configuration template (or raw command) to a device
    pub async fn deploy_config(
        &self,
        request: &ConfigRequest,
    ) -> Result<ConfigResponse, ConsoleError> {
        self.post("/config/deploy", request).await
    }

    /// Fetch the durable deployment audit trail, newest first
    pub async fn config_history(&self) -> Result<Vec<ConfigHistoryEntry>, ConsoleError> {
        self.get("/config/history").await
    }
}
