//! Shared application state
//!
//! Everything the shell and the views need: the API client, the session
//! store, the notifier, the poll scheduler, and the template catalog.
//! Built once at startup and handed around as an `Arc`.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::app::options::AppOptions;
use crate::authn::session::SessionStore;
use crate::catalog::TemplateCatalog;
use crate::errors::ConsoleError;
use crate::http::client::HttpClient;
use crate::http::ConsoleApi;
use crate::notify::Notifier;
use crate::poll::PollScheduler;
use crate::storage::layout::StorageLayout;
use crate::storage::settings::Settings;

pub struct AppState {
    pub settings: Settings,
    pub layout: StorageLayout,
    pub session: Arc<SessionStore>,
    pub api: Arc<dyn ConsoleApi>,
    pub notifier: Arc<Notifier>,
    pub scheduler: Arc<PollScheduler>,
    pub catalog: Arc<TemplateCatalog>,
}

impl AppState {
    /// Wire up all shared services
    pub async fn initialize(options: &AppOptions, layout: StorageLayout) -> Result<Arc<Self>, ConsoleError> {
        layout.setup().await?;

        let session = Arc::new(SessionStore::load(layout.session_file()).await);
        let api: Arc<dyn ConsoleApi> = Arc::new(HttpClient::new(
            &options.settings.backend.base_url,
            Arc::clone(&session),
        )?);
        let notifier = Arc::new(Notifier::new(Duration::from_secs(
            options.settings.toast_duration_secs,
        )));
        let scheduler = PollScheduler::new(Arc::clone(&api), options.settings.polling.clone());
        scheduler.watch_phase(session.subscribe());
        let catalog = Arc::new(TemplateCatalog::load(&layout.templates_file()).await?);

        info!(
            "Console ready against {} ({} templates)",
            options.settings.backend.base_url,
            catalog.templates().len()
        );

        Ok(Arc::new(Self {
            settings: options.settings.clone(),
            layout,
            session,
            api,
            notifier,
            scheduler,
            catalog,
        }))
    }

    /// Stop background work. Idempotent.
    pub fn shutdown(&self) {
        self.scheduler.shutdown_all();
    }
}
