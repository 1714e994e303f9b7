use std::path::PathBuf;

use tracing::{debug, error};

use confweaver::app::{run, AppOptions};
use confweaver::errors::ConsoleError;
use confweaver::logs::{init_logging, LogLevel};
use confweaver::storage::layout::StorageLayout;
use confweaver::storage::settings::Settings;
use confweaver::utils::version_info;

fn parse_flag(arg: &str, name: &str) -> Option<String> {
    arg.strip_prefix(&format!("--{}=", name))
        .map(|v| v.to_string())
}

#[tokio::main]
async fn main() -> Result<(), ConsoleError> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut base_url: Option<String> = None;
    let mut base_dir: Option<PathBuf> = None;
    let mut log_level: Option<LogLevel> = None;

    for arg in &args {
        if arg == "--version" || arg == "-V" {
            println!("confweaver {}", version_info());
            return Ok(());
        } else if let Some(value) = parse_flag(arg, "base-url") {
            base_url = Some(value);
        } else if let Some(value) = parse_flag(arg, "base-dir") {
            base_dir = Some(PathBuf::from(value));
        } else if let Some(value) = parse_flag(arg, "log-level") {
            log_level = Some(
                value
                    .parse()
                    .map_err(ConsoleError::ConfigError)?,
            );
        } else {
            eprintln!("Unknown argument: {}", arg);
            eprintln!(
                "Usage: confweaver [--version] [--base-url=URL] [--base-dir=DIR] [--log-level=LEVEL]"
            );
            std::process::exit(2);
        }
    }

    let layout = match &base_dir {
        Some(dir) => StorageLayout::new(dir.clone()),
        None => StorageLayout::default(),
    };

    // Missing or unreadable settings fall back to defaults
    let settings_file = layout.settings_file();
    let settings: Settings = if settings_file.exists().await {
        settings_file.read_json().await.unwrap_or_default()
    } else {
        Settings::default()
    };

    let mut options = AppOptions::new(settings);
    if let Some(url) = base_url {
        options = options.with_base_url(&url);
    }
    if let Some(dir) = base_dir {
        options = options.with_base_dir(dir);
    }
    if let Some(level) = log_level {
        options = options.with_log_level(level);
    }

    let log_dir = layout.logs_dir().path().to_path_buf();
    let _guard = init_logging(options.log_options(Some(log_dir)))?;
    debug!("confweaver {}", version_info());

    if let Err(e) = run(options).await {
        error!("Console exited with error: {}", e);
        return Err(e);
    }
    Ok(())
}
