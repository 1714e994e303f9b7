//! Activity log API client

use weaver_models::ActivityLogEntry;

use crate::errors::ConsoleError;
use crate::http::client::HttpClient;

impl HttpClient {
    /// Device activity entries, newest first
    pub async fn activity_logs(&self) -> Result<Vec<ActivityLogEntry>, ConsoleError> {
        self.get("/logs/").await
    }
}
