//! Device metrics view
//!
//! Shows one device's resource utilization, kept fresh by the poll
//! scheduler with an on-demand refresh escape hatch.

use std::sync::Arc;

use tracing::debug;

use crate::errors::ConsoleError;
use crate::http::ConsoleApi;
use crate::metrics::MetricsSnapshot;
use crate::poll::{PollKey, PollScheduler, PollUpdate, Subscription};

pub struct MetricsView {
    api: Arc<dyn ConsoleApi>,
    scheduler: Arc<PollScheduler>,
    watched: Option<(i64, Subscription)>,
    snapshot: Option<MetricsSnapshot>,
}

impl MetricsView {
    pub fn new(api: Arc<dyn ConsoleApi>, scheduler: Arc<PollScheduler>) -> Self {
        Self {
            api,
            scheduler,
            watched: None,
            snapshot: None,
        }
    }

    pub fn watched_device(&self) -> Option<i64> {
        self.watched.as_ref().map(|(id, _)| *id)
    }

    pub fn snapshot(&self) -> Option<&MetricsSnapshot> {
        self.snapshot.as_ref()
    }

    /// Follow a device. Dropping the previous subscription releases its
    /// poll loop if no other view holds it.
    pub fn watch(&mut self, device_id: i64) {
        if self.watched_device() == Some(device_id) {
            return;
        }
        debug!("Watching metrics for device {}", device_id);
        let subscription = self.scheduler.subscribe(PollKey::DeviceMetrics(device_id));
        if let Some(PollUpdate::Metrics(raw)) = subscription.latest() {
            self.snapshot = Some(MetricsSnapshot::from_raw(&raw));
        } else {
            self.snapshot = None;
        }
        self.watched = Some((device_id, subscription));
    }

    pub fn unwatch(&mut self) {
        self.watched = None;
        self.snapshot = None;
    }

    /// Block until the next scheduled sample for the watched device
    pub async fn next_sample(&mut self) -> Option<&MetricsSnapshot> {
        let (_, subscription) = self.watched.as_mut()?;
        if let PollUpdate::Metrics(raw) = subscription.changed().await? {
            self.snapshot = Some(MetricsSnapshot::from_raw(&raw));
        }
        self.snapshot.as_ref()
    }

    /// Fetch a sample immediately, outside the schedule
    pub async fn refresh_now(&mut self) -> Result<MetricsSnapshot, ConsoleError> {
        let device_id = self.watched_device().ok_or_else(|| {
            ConsoleError::ValidationError("Select a device first".to_string())
        })?;
        let raw = self.api.resource_metrics(device_id).await?;
        let snapshot = MetricsSnapshot::from_raw(&raw);
        self.snapshot = Some(snapshot.clone());
        Ok(snapshot)
    }
}
