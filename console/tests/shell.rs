//! Shell behavior around the session lifecycle

mod common;

use std::sync::Arc;
use std::time::Duration;

use weaver_models::TokenResponse;

use common::FakeApi;
use confweaver::app::shell::Shell;
use confweaver::app::state::AppState;
use confweaver::authn::session::SessionStore;
use confweaver::catalog::TemplateCatalog;
use confweaver::http::ConsoleApi;
use confweaver::notify::Notifier;
use confweaver::poll::PollScheduler;
use confweaver::storage::layout::StorageLayout;
use confweaver::storage::settings::{PollingSettings, Settings};

async fn app_state(api: Arc<FakeApi>) -> Arc<AppState> {
    let base = std::env::temp_dir().join(format!("weaver-shell-{}", uuid::Uuid::new_v4()));
    let layout = StorageLayout::new(base);
    layout.setup().await.unwrap();

    let session = Arc::new(SessionStore::load(layout.session_file()).await);
    let api: Arc<dyn ConsoleApi> = api;
    let scheduler = PollScheduler::new(Arc::clone(&api), PollingSettings::default());
    scheduler.watch_phase(session.subscribe());

    Arc::new(AppState {
        settings: Settings::default(),
        layout,
        session,
        api,
        notifier: Arc::new(Notifier::new(Duration::from_secs(5))),
        scheduler,
        catalog: Arc::new(TemplateCatalog::built_in()),
    })
}

fn script_login(api: &FakeApi) {
    api.login_responses
        .lock()
        .unwrap()
        .push_back(Ok(TokenResponse {
            access_token: "token".to_string(),
            token_type: "bearer".to_string(),
        }));
}

#[tokio::test(start_paused = true)]
async fn login_starts_the_alert_feed() {
    let api = Arc::new(FakeApi::default());
    script_login(&api);
    api.status_responses.lock().unwrap().push_back(Ok(vec![]));

    let state = app_state(Arc::clone(&api)).await;
    let mut shell = Shell::new(Arc::clone(&state));
    assert_eq!(state.scheduler.active_loops(), 0);

    // The status feed behind the prompt badge starts with the session,
    // not on the first dashboard command
    shell.handle_command("login admin secret").await.unwrap();
    assert_eq!(state.scheduler.active_loops(), 1);
}

#[tokio::test(start_paused = true)]
async fn logout_releases_the_alert_feed() {
    let api = Arc::new(FakeApi::default());
    script_login(&api);
    api.status_responses.lock().unwrap().push_back(Ok(vec![]));

    let state = app_state(Arc::clone(&api)).await;
    let mut shell = Shell::new(Arc::clone(&state));
    shell.handle_command("login admin secret").await.unwrap();
    assert_eq!(state.scheduler.active_loops(), 1);

    shell.handle_command("logout").await.unwrap();
    assert_eq!(state.scheduler.active_loops(), 0);
    assert!(!state.session.is_authenticated().await);
}
