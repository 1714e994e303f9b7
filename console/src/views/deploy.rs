//! Configuration deployment view
//!
//! The operator picks a device and a template, fills the template's
//! parameters, and submits. Outcomes accumulate in an execution log,
//! newest first. Only one deployment may be in flight at a time.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use chrono::Local;
use tracing::{info, warn};
use weaver_models::ConfigRequest;

use crate::catalog::{ConfigTemplate, TemplateCatalog};
use crate::errors::ConsoleError;
use crate::http::ConsoleApi;
use crate::notify::Notifier;

const LOG_CAPACITY: usize = 200;

pub struct DeployView {
    api: Arc<dyn ConsoleApi>,
    notifier: Arc<Notifier>,
    catalog: Arc<TemplateCatalog>,
    selected_device: Option<i64>,
    selected_template: Option<String>,
    params: BTreeMap<String, String>,
    custom_command: String,
    in_flight: bool,
    /// Newest entry at the front
    execution_log: VecDeque<String>,
}

impl DeployView {
    pub fn new(
        api: Arc<dyn ConsoleApi>,
        notifier: Arc<Notifier>,
        catalog: Arc<TemplateCatalog>,
    ) -> Self {
        Self {
            api,
            notifier,
            catalog,
            selected_device: None,
            selected_template: None,
            params: BTreeMap::new(),
            custom_command: String::new(),
            in_flight: false,
            execution_log: VecDeque::new(),
        }
    }

    pub fn select_device(&mut self, device_id: i64) {
        self.selected_device = Some(device_id);
    }

    /// Switch templates. Parameters belong to a template, so switching
    /// always clears them.
    pub fn select_template(&mut self, template_id: &str) -> Result<(), ConsoleError> {
        let template = self.catalog.get(template_id).ok_or_else(|| {
            ConsoleError::ValidationError(format!("Unknown template '{}'", template_id))
        })?;
        self.selected_template = Some(template.id.clone());
        self.params.clear();
        self.custom_command.clear();
        Ok(())
    }

    pub fn selected_template(&self) -> Option<&ConfigTemplate> {
        self.selected_template
            .as_deref()
            .and_then(|id| self.catalog.get(id))
    }

    pub fn set_param(&mut self, name: &str, value: &str) {
        self.params.insert(name.to_string(), value.to_string());
    }

    pub fn set_custom_command(&mut self, command: &str) {
        self.custom_command = command.to_string();
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn execution_log(&self) -> impl Iterator<Item = &str> {
        self.execution_log.iter().map(|s| s.as_str())
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    fn push_log(&mut self, line: String) {
        if self.execution_log.len() == LOG_CAPACITY {
            self.execution_log.pop_back();
        }
        self.execution_log.push_front(line);
    }

    fn build_request(&self) -> Result<ConfigRequest, ConsoleError> {
        let device_id = self.selected_device.ok_or_else(|| {
            ConsoleError::ValidationError("Select a device first".to_string())
        })?;
        let template = self.selected_template().ok_or_else(|| {
            ConsoleError::ValidationError("Select a template first".to_string())
        })?;

        if template.is_custom() {
            let command = self.custom_command.trim();
            if command.is_empty() {
                return Err(ConsoleError::ValidationError(
                    "Enter a command to run".to_string(),
                ));
            }
            // The raw command travels in place of a template name
            return Ok(ConfigRequest {
                device_id,
                template_name: command.to_string(),
                params: BTreeMap::new(),
            });
        }

        let mut params = BTreeMap::new();
        for field in &template.fields {
            let value = self
                .params
                .get(&field.name)
                .map(|v| v.trim())
                .unwrap_or("");
            if value.is_empty() {
                return Err(ConsoleError::ValidationError(format!(
                    "{} is required",
                    field.label
                )));
            }
            params.insert(field.name.clone(), value.to_string());
        }

        Ok(ConfigRequest {
            device_id,
            template_name: template.id.clone(),
            params,
        })
    }

    /// Submit the current selection to the backend
    pub async fn deploy(&mut self) -> Result<(), ConsoleError> {
        if self.in_flight {
            return Err(ConsoleError::ValidationError(
                "A deployment is already in progress".to_string(),
            ));
        }
        let request = self.build_request()?;

        self.in_flight = true;
        let result = self.api.deploy_config(&request).await;
        self.in_flight = false;

        let stamp = Local::now().format("%H:%M:%S");
        match result {
            Ok(response) => {
                info!(
                    "Deployed '{}' to device {}: {}",
                    request.template_name, request.device_id, response.message
                );
                self.push_log(format!("[Success] {}: {}", stamp, response.message));
                self.notifier.success(response.message);
                Ok(())
            }
            Err(err) => {
                warn!(
                    "Deployment of '{}' to device {} failed: {}",
                    request.template_name, request.device_id, err
                );
                self.push_log(format!("[Error] {}: {}", stamp, err));
                self.notifier.error(err.to_string());
                Err(err)
            }
        }
    }

    /// Mark a rollback in the execution log. The backend exposes no
    /// rollback endpoint yet, so this is an operator-facing marker only;
    /// it is available whenever a device is selected.
    pub fn rollback(&mut self) -> Result<(), ConsoleError> {
        if self.selected_device.is_none() {
            return Err(ConsoleError::ValidationError(
                "Select a device first".to_string(),
            ));
        }
        let stamp = Local::now().format("%H:%M:%S");
        self.push_log(format!("[Rollback] {}: Rollback initiated", stamp));
        self.notifier.info("Rollback initiated");
        Ok(())
    }

    pub fn clear_log(&mut self) {
        self.execution_log.clear();
    }
}
