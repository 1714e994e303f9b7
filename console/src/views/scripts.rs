//! RouterOS script view
//!
//! Server-side script catalog plus per-session execution records, newest
//! first.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Local};
use tracing::info;
use weaver_models::ScriptInfo;

use crate::errors::ConsoleError;
use crate::http::ConsoleApi;
use crate::notify::Notifier;

const EXECUTION_LOG_CAPACITY: usize = 100;

/// One completed script run
#[derive(Debug, Clone)]
pub struct ScriptExecution {
    pub time: DateTime<Local>,
    pub device_id: i64,
    pub script: String,
    pub status: String,
    pub details: String,
}

pub struct ScriptsView {
    api: Arc<dyn ConsoleApi>,
    notifier: Arc<Notifier>,
    scripts: Vec<ScriptInfo>,
    /// Newest run at the front
    executions: VecDeque<ScriptExecution>,
}

impl ScriptsView {
    pub fn new(api: Arc<dyn ConsoleApi>, notifier: Arc<Notifier>) -> Self {
        Self {
            api,
            notifier,
            scripts: Vec::new(),
            executions: VecDeque::new(),
        }
    }

    pub fn scripts(&self) -> &[ScriptInfo] {
        &self.scripts
    }

    pub fn executions(&self) -> impl Iterator<Item = &ScriptExecution> {
        self.executions.iter()
    }

    pub async fn refresh(&mut self) -> Result<(), ConsoleError> {
        self.scripts = self.api.list_scripts().await?;
        Ok(())
    }

    fn record(&mut self, execution: ScriptExecution) {
        if self.executions.len() == EXECUTION_LOG_CAPACITY {
            self.executions.pop_back();
        }
        self.executions.push_front(execution);
    }

    /// Run a catalog script on a device
    pub async fn execute(
        &mut self,
        device_id: i64,
        script_name: &str,
    ) -> Result<(), ConsoleError> {
        if self.scripts.iter().all(|s| s.name != script_name) {
            return Err(ConsoleError::ValidationError(format!(
                "Unknown script '{}'",
                script_name
            )));
        }

        match self.api.execute_script(device_id, script_name).await {
            Ok(result) => {
                info!("Executed '{}' on device {}", script_name, device_id);
                self.notifier.success(result.message.clone());
                self.record(ScriptExecution {
                    time: Local::now(),
                    device_id,
                    script: script_name.to_string(),
                    status: result.status,
                    details: result.message,
                });
                Ok(())
            }
            Err(err) => {
                self.notifier.error(err.to_string());
                self.record(ScriptExecution {
                    time: Local::now(),
                    device_id,
                    script: script_name.to_string(),
                    status: "error".to_string(),
                    details: err.to_string(),
                });
                Err(err)
            }
        }
    }
}
