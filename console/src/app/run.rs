//! Console lifecycle
//!
//! Builds the shared state, runs the shell, and shuts everything down
//! when the shell exits or a termination signal arrives.

use tokio::sync::broadcast;
use tracing::{error, info};

use crate::app::options::AppOptions;
use crate::app::shell::Shell;
use crate::app::state::AppState;
use crate::errors::ConsoleError;
use crate::storage::layout::StorageLayout;

/// Run the console until the operator quits or the process is signalled
pub async fn run(options: AppOptions) -> Result<(), ConsoleError> {
    let layout = match &options.base_dir {
        Some(dir) => StorageLayout::new(dir.clone()),
        None => StorageLayout::default(),
    };

    let state = AppState::initialize(&options, layout).await?;

    let (shutdown_tx, _) = broadcast::channel(1);
    let signal_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        if let Err(e) = await_shutdown_signal().await {
            error!("Signal handler failed: {}", e);
            return;
        }
        info!("Termination signal received");
        let _ = signal_tx.send(());
    });

    let mut shell = Shell::new(state.clone());
    let result = shell.run(shutdown_tx.subscribe()).await;

    state.shutdown();
    info!("Console stopped");
    result
}

#[cfg(unix)]
async fn await_shutdown_signal() -> Result<(), ConsoleError> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        _ = interrupt.recv() => {}
        _ = terminate.recv() => {}
    }
    Ok(())
}

#[cfg(not(unix))]
async fn await_shutdown_signal() -> Result<(), ConsoleError> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
