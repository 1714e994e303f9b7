//! Poll scheduler behavior

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;
use tokio::sync::Semaphore;
use weaver_models::{
    ActionResult, ActivityLogEntry, ConfigHistoryEntry, ConfigRequest, ConfigResponse, Device,
    DeviceCreate, DeviceStatusEntry, LinkStatus, ResourceMetrics, ScriptInfo, TokenResponse,
};

use common::FakeApi;
use confweaver::authn::session::SessionStore;
use confweaver::errors::ConsoleError;
use confweaver::filesys::file::File;
use confweaver::http::ConsoleApi;
use confweaver::poll::{PollKey, PollScheduler, PollUpdate};
use confweaver::storage::settings::PollingSettings;

fn status_entry(id: i64, status: LinkStatus) -> DeviceStatusEntry {
    DeviceStatusEntry {
        id,
        name: format!("device-{}", id),
        ip_address: format!("10.0.0.{}", id),
        status,
    }
}

fn scheduler(api: Arc<FakeApi>) -> Arc<PollScheduler> {
    PollScheduler::new(api, PollingSettings::default())
}

#[tokio::test(start_paused = true)]
async fn first_fetch_happens_immediately() {
    let api = Arc::new(FakeApi::default());
    api.status_responses
        .lock()
        .unwrap()
        .push_back(Ok(vec![status_entry(1, LinkStatus::Up)]));

    let scheduler = scheduler(Arc::clone(&api));
    let mut sub = scheduler.subscribe(PollKey::DeviceStatus);

    match sub.changed().await {
        Some(PollUpdate::Status(entries)) => assert_eq!(entries.len(), 1),
        other => panic!("expected a status update, got {:?}", other.is_some()),
    }
}

#[tokio::test(start_paused = true)]
async fn concurrent_subscribers_share_one_loop() {
    let api = Arc::new(FakeApi::default());
    api.status_responses
        .lock()
        .unwrap()
        .push_back(Ok(vec![status_entry(1, LinkStatus::Up)]));

    let scheduler = scheduler(Arc::clone(&api));
    let mut first = scheduler.subscribe(PollKey::DeviceStatus);
    let second = scheduler.subscribe(PollKey::DeviceStatus);
    assert_eq!(scheduler.active_loops(), 1);

    // Both receivers observe the same committed result
    let update = first.changed().await;
    assert!(matches!(update, Some(PollUpdate::Status(_))));
    assert!(matches!(second.latest(), Some(PollUpdate::Status(_))));

    drop(first);
    assert_eq!(scheduler.active_loops(), 1);
    drop(second);
    assert_eq!(scheduler.active_loops(), 0);
}

#[tokio::test(start_paused = true)]
async fn metrics_loops_are_per_device() {
    let api = Arc::new(FakeApi::default());
    {
        let mut q = api.metrics_responses.lock().unwrap();
        q.push_back(Ok(ResourceMetrics::default()));
        q.push_back(Ok(ResourceMetrics::default()));
    }

    let scheduler = scheduler(Arc::clone(&api));
    let _a = scheduler.subscribe(PollKey::DeviceMetrics(1));
    let _b = scheduler.subscribe(PollKey::DeviceMetrics(2));
    let _a2 = scheduler.subscribe(PollKey::DeviceMetrics(1));
    assert_eq!(scheduler.active_loops(), 2);
}

#[tokio::test(start_paused = true)]
async fn failed_fetch_keeps_the_last_good_value() {
    let api = Arc::new(FakeApi::default());
    {
        let mut q = api.status_responses.lock().unwrap();
        q.push_back(Ok(vec![status_entry(1, LinkStatus::Up)]));
        q.push_back(Err(FakeApi::api_error(503, "backend restarting")));
        q.push_back(Ok(vec![
            status_entry(1, LinkStatus::Up),
            status_entry(2, LinkStatus::Down),
        ]));
    }

    let scheduler = scheduler(Arc::clone(&api));
    let mut sub = scheduler.subscribe(PollKey::DeviceStatus);

    let first = sub.changed().await;
    match &first {
        Some(PollUpdate::Status(entries)) => assert_eq!(entries.len(), 1),
        _ => panic!("expected first status update"),
    }

    // The failed cycle commits nothing; the next change is the third fetch
    let second = sub.changed().await;
    match &second {
        Some(PollUpdate::Status(entries)) => assert_eq!(entries.len(), 2),
        _ => panic!("expected second status update"),
    }
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_every_loop() {
    let api = Arc::new(FakeApi::default());
    {
        let mut q = api.status_responses.lock().unwrap();
        q.push_back(Ok(vec![]));
    }
    api.logs_responses.lock().unwrap().push_back(Ok(vec![]));

    let scheduler = scheduler(Arc::clone(&api));
    let _status = scheduler.subscribe(PollKey::DeviceStatus);
    let _logs = scheduler.subscribe(PollKey::ActivityLogs);
    assert_eq!(scheduler.active_loops(), 2);

    scheduler.shutdown_all();
    assert_eq!(scheduler.active_loops(), 0);
}

#[tokio::test(start_paused = true)]
async fn session_expiry_stops_every_loop() {
    let api = Arc::new(FakeApi::default());
    api.status_responses.lock().unwrap().push_back(Ok(vec![]));

    let path = std::env::temp_dir().join(format!("weaver-session-{}.json", uuid::Uuid::new_v4()));
    let session = SessionStore::load(File::new(path)).await;
    session
        .establish("admin", SecretString::from("token".to_string()))
        .await
        .unwrap();

    let scheduler = scheduler(Arc::clone(&api));
    scheduler.watch_phase(session.subscribe());
    let _sub = scheduler.subscribe(PollKey::DeviceStatus);
    assert_eq!(scheduler.active_loops(), 1);

    // A 401 path invalidates the session; every loop must wind down
    session.invalidate().await;
    while scheduler.active_loops() > 0 {
        tokio::task::yield_now().await;
    }
}

/// Backend double whose status fetch parks until the test releases it
struct GatedApi {
    gate: Semaphore,
    started: AtomicUsize,
    completed: AtomicUsize,
}

impl GatedApi {
    fn new() -> Self {
        Self {
            gate: Semaphore::new(0),
            started: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        }
    }

    fn unused<T>() -> Result<T, ConsoleError> {
        Err(ConsoleError::Internal("not scripted".to_string()))
    }
}

#[async_trait]
impl ConsoleApi for GatedApi {
    async fn login(
        &self,
        _username: &str,
        _password: &SecretString,
    ) -> Result<TokenResponse, ConsoleError> {
        Self::unused()
    }

    async fn list_devices(&self) -> Result<Vec<Device>, ConsoleError> {
        Self::unused()
    }

    async fn create_device(
        &self,
        _device: &DeviceCreate,
        _validate_connectivity: bool,
    ) -> Result<Device, ConsoleError> {
        Self::unused()
    }

    async fn delete_device(&self, _device_id: i64) -> Result<(), ConsoleError> {
        Self::unused()
    }

    async fn monitoring_status(&self) -> Result<Vec<DeviceStatusEntry>, ConsoleError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| ConsoleError::Cancelled)?;
        self.completed.fetch_add(1, Ordering::SeqCst);
        Ok(vec![status_entry(1, LinkStatus::Up)])
    }

    async fn deploy_config(
        &self,
        _request: &ConfigRequest,
    ) -> Result<ConfigResponse, ConsoleError> {
        Self::unused()
    }

    async fn config_history(&self) -> Result<Vec<ConfigHistoryEntry>, ConsoleError> {
        Self::unused()
    }

    async fn list_scripts(&self) -> Result<Vec<ScriptInfo>, ConsoleError> {
        Self::unused()
    }

    async fn execute_script(
        &self,
        _device_id: i64,
        _script_name: &str,
    ) -> Result<ActionResult, ConsoleError> {
        Self::unused()
    }

    async fn resource_metrics(&self, _device_id: i64) -> Result<ResourceMetrics, ConsoleError> {
        Self::unused()
    }

    async fn activity_logs(&self) -> Result<Vec<ActivityLogEntry>, ConsoleError> {
        Self::unused()
    }

    async fn test_connection(&self, _device_id: i64) -> Result<ActionResult, ConsoleError> {
        Self::unused()
    }
}

#[tokio::test(start_paused = true)]
async fn dropped_subscription_discards_an_in_flight_fetch() {
    let api = Arc::new(GatedApi::new());
    let scheduler = PollScheduler::new(Arc::clone(&api) as _, PollingSettings::default());

    let sub = scheduler.subscribe(PollKey::DeviceStatus);
    while api.started.load(Ordering::SeqCst) == 0 {
        tokio::task::yield_now().await;
    }
    assert!(sub.latest().is_none());

    // The last subscriber leaves while the fetch is still parked
    drop(sub);
    assert_eq!(scheduler.active_loops(), 0);

    // Releasing the gate must not let the abandoned fetch finish
    api.gate.add_permits(1);
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
    assert_eq!(api.completed.load(Ordering::SeqCst), 0);
}
