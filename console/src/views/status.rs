//! Connection status view
//!
//! Live reachability feed plus on-demand per-device connectivity probes.

use std::collections::HashMap;
use std::sync::Arc;

use weaver_models::{ActionResult, DeviceStatusEntry};

use crate::errors::ConsoleError;
use crate::http::ConsoleApi;
use crate::notify::Notifier;
use crate::poll::{PollUpdate, Subscription};

pub struct StatusView {
    api: Arc<dyn ConsoleApi>,
    notifier: Arc<Notifier>,
    subscription: Subscription,
    entries: Vec<DeviceStatusEntry>,
    probe_results: HashMap<i64, ActionResult>,
}

impl StatusView {
    pub fn new(
        api: Arc<dyn ConsoleApi>,
        notifier: Arc<Notifier>,
        subscription: Subscription,
    ) -> Self {
        let mut view = Self {
            api,
            notifier,
            subscription,
            entries: Vec::new(),
            probe_results: HashMap::new(),
        };
        if let Some(update) = view.subscription.latest() {
            view.apply(update);
        }
        view
    }

    fn apply(&mut self, update: PollUpdate) {
        if let PollUpdate::Status(entries) = update {
            self.entries = entries;
        }
    }

    pub fn entries(&self) -> &[DeviceStatusEntry] {
        &self.entries
    }

    pub fn probe_result(&self, device_id: i64) -> Option<&ActionResult> {
        self.probe_results.get(&device_id)
    }

    /// Block until the next status report arrives
    pub async fn next_report(&mut self) -> Option<&[DeviceStatusEntry]> {
        let update = self.subscription.changed().await?;
        self.apply(update);
        Some(&self.entries)
    }

    /// Probe one device's API reachability on demand
    pub async fn test_connection(&mut self, device_id: i64) -> Result<(), ConsoleError> {
        match self.api.test_connection(device_id).await {
            Ok(result) => {
                self.notifier.success(result.message.clone());
                self.probe_results.insert(device_id, result);
                Ok(())
            }
            Err(err) => {
                self.notifier.error(err.to_string());
                Err(err)
            }
        }
    }
}
