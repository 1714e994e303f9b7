//! Security policy view
//!
//! A thin, one-shot surface over the `block_website` template for
//! operators who only manage access policy.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;
use weaver_models::ConfigRequest;

use crate::errors::ConsoleError;
use crate::http::ConsoleApi;
use crate::notify::Notifier;

pub struct SecurityView {
    api: Arc<dyn ConsoleApi>,
    notifier: Arc<Notifier>,
}

impl SecurityView {
    pub fn new(api: Arc<dyn ConsoleApi>, notifier: Arc<Notifier>) -> Self {
        Self { api, notifier }
    }

    /// Block access to a website from the given device
    pub async fn block_website(&self, device_id: i64, url: &str) -> Result<(), ConsoleError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ConsoleError::ValidationError(
                "Enter a website to block".to_string(),
            ));
        }

        let mut params = BTreeMap::new();
        params.insert("url".to_string(), url.to_string());
        let request = ConfigRequest {
            device_id,
            template_name: "block_website".to_string(),
            params,
        };

        match self.api.deploy_config(&request).await {
            Ok(response) => {
                info!("Blocked {} on device {}", url, device_id);
                self.notifier.success(response.message);
                Ok(())
            }
            Err(err) => {
                self.notifier.error(err.to_string());
                Err(err)
            }
        }
    }
}
