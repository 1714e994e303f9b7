//! Deduplicated poll loops
//!
//! Each poll key owns at most one background task regardless of how many
//! views are subscribed. The first subscription spawns the loop (which
//! fetches immediately, then on its interval); later subscriptions attach
//! to the same watch channel; the last unsubscribe stops the task. A fetch
//! raced against shutdown never commits a result.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use weaver_models::{ActivityLogEntry, ConfigHistoryEntry, DeviceStatusEntry, ResourceMetrics};

use crate::authn::session::SessionPhase;
use crate::http::ConsoleApi;
use crate::storage::settings::PollingSettings;

/// Identity of one poll loop. Metrics polls are per device; the rest are
/// global feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollKey {
    DeviceStatus,
    DeviceMetrics(i64),
    ActivityLogs,
    ConfigHistory,
}

impl PollKey {
    fn describe(&self) -> String {
        match self {
            PollKey::DeviceStatus => "device status".to_string(),
            PollKey::DeviceMetrics(id) => format!("metrics for device {}", id),
            PollKey::ActivityLogs => "activity logs".to_string(),
            PollKey::ConfigHistory => "config history".to_string(),
        }
    }
}

/// A committed poll result
#[derive(Debug, Clone)]
pub enum PollUpdate {
    Status(Vec<DeviceStatusEntry>),
    Metrics(ResourceMetrics),
    Logs(Vec<ActivityLogEntry>),
    History(Vec<ConfigHistoryEntry>),
}

struct PollEntry {
    subscribers: usize,
    tx: watch::Sender<Option<PollUpdate>>,
    handle: JoinHandle<()>,
}

/// Shared owner of all background poll loops
pub struct PollScheduler {
    api: Arc<dyn ConsoleApi>,
    intervals: PollingSettings,
    entries: Mutex<HashMap<PollKey, PollEntry>>,
    shutdown_tx: broadcast::Sender<()>,
}

impl PollScheduler {
    pub fn new(api: Arc<dyn ConsoleApi>, intervals: PollingSettings) -> Arc<Self> {
        let (shutdown_tx, _) = broadcast::channel(1);
        Arc::new(Self {
            api,
            intervals,
            entries: Mutex::new(HashMap::new()),
            shutdown_tx,
        })
    }

    fn interval_for(&self, key: PollKey) -> Duration {
        let secs = match key {
            PollKey::DeviceStatus => self.intervals.status_interval_secs,
            PollKey::DeviceMetrics(_) => self.intervals.metrics_interval_secs,
            PollKey::ActivityLogs => self.intervals.logs_interval_secs,
            PollKey::ConfigHistory => self.intervals.history_interval_secs,
        };
        Duration::from_secs(secs.max(1))
    }

    /// Attach to the poll loop for `key`, spawning it if it is not running
    pub fn subscribe(self: &Arc<Self>, key: PollKey) -> Subscription {
        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = entries.get_mut(&key) {
            entry.subscribers += 1;
            debug!(
                "Joined existing poll loop for {} ({} subscribers)",
                key.describe(),
                entry.subscribers
            );
            return Subscription {
                key,
                rx: entry.tx.subscribe(),
                scheduler: Arc::clone(self),
            };
        }

        let (tx, rx) = watch::channel(None);
        let handle = self.spawn_loop(key, tx.clone());
        entries.insert(
            key,
            PollEntry {
                subscribers: 1,
                tx,
                handle,
            },
        );
        info!("Started poll loop for {}", key.describe());
        Subscription {
            key,
            rx,
            scheduler: Arc::clone(self),
        }
    }

    fn spawn_loop(self: &Arc<Self>, key: PollKey, tx: watch::Sender<Option<PollUpdate>>) -> JoinHandle<()> {
        let api = Arc::clone(&self.api);
        let interval = self.interval_for(key);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            loop {
                // Racing the fetch against shutdown means a response that
                // arrives after shutdown is never committed.
                tokio::select! {
                    result = fetch(api.as_ref(), key) => {
                        match result {
                            Ok(update) => {
                                let _ = tx.send(Some(update));
                            }
                            Err(err) => {
                                // Subscribers keep the last good value
                                warn!("Poll of {} failed: {}", key.describe(), err);
                            }
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        debug!("Poll loop for {} shutting down", key.describe());
                        return;
                    }
                }

                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = shutdown_rx.recv() => {
                        debug!("Poll loop for {} shutting down", key.describe());
                        return;
                    }
                }
            }
        })
    }

    fn unsubscribe(&self, key: PollKey) {
        let mut entries = self.entries.lock().unwrap();
        let Some(entry) = entries.get_mut(&key) else {
            return;
        };
        entry.subscribers -= 1;
        if entry.subscribers == 0 {
            if let Some(entry) = entries.remove(&key) {
                entry.handle.abort();
            }
            info!("Stopped poll loop for {}", key.describe());
        }
    }

    /// Stop every poll loop. Idempotent.
    pub fn shutdown_all(&self) {
        let _ = self.shutdown_tx.send(());
        let mut entries = self.entries.lock().unwrap();
        for (key, entry) in entries.drain() {
            entry.handle.abort();
            debug!("Stopped poll loop for {}", key.describe());
        }
    }

    /// Number of poll loops currently running
    pub fn active_loops(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Stop every loop whenever the session drops to anonymous. Polling is
    /// pointless without a token, and a rejected token would otherwise keep
    /// a loop hammering the backend with doomed requests.
    pub fn watch_phase(self: &Arc<Self>, mut phase_rx: watch::Receiver<SessionPhase>) {
        let scheduler = Arc::downgrade(self);
        tokio::spawn(async move {
            while phase_rx.changed().await.is_ok() {
                if *phase_rx.borrow() == SessionPhase::Anonymous {
                    match scheduler.upgrade() {
                        Some(scheduler) => scheduler.shutdown_all(),
                        None => return,
                    }
                }
            }
        });
    }
}

async fn fetch(api: &dyn ConsoleApi, key: PollKey) -> Result<PollUpdate, crate::errors::ConsoleError> {
    match key {
        PollKey::DeviceStatus => api.monitoring_status().await.map(PollUpdate::Status),
        PollKey::DeviceMetrics(id) => api.resource_metrics(id).await.map(PollUpdate::Metrics),
        PollKey::ActivityLogs => api.activity_logs().await.map(PollUpdate::Logs),
        PollKey::ConfigHistory => api.config_history().await.map(PollUpdate::History),
    }
}

/// A live attachment to one poll loop. Dropping it detaches; the loop
/// stops when its last subscriber is gone.
pub struct Subscription {
    key: PollKey,
    rx: watch::Receiver<Option<PollUpdate>>,
    scheduler: Arc<PollScheduler>,
}

impl Subscription {
    pub fn key(&self) -> PollKey {
        self.key
    }

    /// Latest committed result, if any fetch has succeeded yet
    pub fn latest(&self) -> Option<PollUpdate> {
        self.rx.borrow().clone()
    }

    /// Wait for the next committed result
    pub async fn changed(&mut self) -> Option<PollUpdate> {
        if self.rx.changed().await.is_err() {
            return None;
        }
        self.rx.borrow_and_update().clone()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.scheduler.unsubscribe(self.key);
    }
}
