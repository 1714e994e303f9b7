//! Device inventory API client

use weaver_models::{Device, DeviceCreate};

use crate::errors::ConsoleError;
use crate::http::client::HttpClient;

impl HttpClient {
    /// List all managed devices
    pub async fn list_devices(&self) -> Result<Vec<Device>, ConsoleError> {
        self.get("/devices/").await
    }

    /// Create a device, optionally asking the backend to validate
    /// connectivity before persisting it
    pub async fn create_device(
        &self,
        device: &DeviceCreate,
        validate_connectivity: bool,
    ) -> Result<Device, ConsoleError> {
        self.post_with_query(
            "/devices/",
            &[("validate_connectivity", validate_connectivity)],
            device,
        )
        .await
    }

    /// Delete a device by identifier
    pub async fn delete_device(&self, device_id: i64) -> Result<(), ConsoleError> {
        self.delete(&format!("/devices/{}", device_id)).await
    }
}
