//! Interactive shell
//!
//! A line-oriented command loop over stdin. Commands map onto the view
//! controllers; rendering is plain text with color. Log output goes to
//! stderr so stdout stays clean for the shell itself.

use std::io::Write;
use std::sync::Arc;

use chrono::Local;
use colored::Colorize;
use secrecy::SecretString;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use weaver_models::{ActivityLevel, LinkStatus};

use crate::app::router::{guard, Route};
use crate::app::state::AppState;
use crate::authn::session::SessionPhase;
use crate::errors::ConsoleError;
use crate::metrics::{format_bytes, SeverityBand};
use crate::notify::ToastSeverity;
use crate::poll::PollKey;
use crate::views::dashboard::DashboardView;
use crate::views::deploy::DeployView;
use crate::views::devices::{InventoryView, NewDeviceForm};
use crate::views::history::HistoryView;
use crate::views::login::LoginView;
use crate::views::logs::LogsView;
use crate::views::metrics::MetricsView;
use crate::views::scripts::ScriptsView;
use crate::views::security::SecurityView;
use crate::views::status::StatusView;

/// How long a freshly-subscribed view waits for its first poll result
const FIRST_REPORT_WAIT: std::time::Duration = std::time::Duration::from_secs(10);

#[derive(PartialEq)]
enum Flow {
    Continue,
    Quit,
}

pub struct Shell {
    state: Arc<AppState>,
    login: LoginView,
    inventory: InventoryView,
    deploy: DeployView,
    security: SecurityView,
    scripts: ScriptsView,
    metrics: MetricsView,
    // Polling views attach to the scheduler, so they are created on first
    // use and torn down on logout.
    dashboard: Option<DashboardView>,
    status: Option<StatusView>,
    history: Option<HistoryView>,
    logs: Option<LogsView>,
}

impl Shell {
    pub fn new(state: Arc<AppState>) -> Self {
        let api = Arc::clone(&state.api);
        Self {
            login: LoginView::new(
                Arc::clone(&api),
                Arc::clone(&state.session),
                Arc::clone(&state.notifier),
            ),
            inventory: InventoryView::new(Arc::clone(&api), Arc::clone(&state.notifier)),
            deploy: DeployView::new(
                Arc::clone(&api),
                Arc::clone(&state.notifier),
                Arc::clone(&state.catalog),
            ),
            security: SecurityView::new(Arc::clone(&api), Arc::clone(&state.notifier)),
            scripts: ScriptsView::new(Arc::clone(&api), Arc::clone(&state.notifier)),
            metrics: MetricsView::new(Arc::clone(&api), Arc::clone(&state.scheduler)),
            dashboard: None,
            status: None,
            history: None,
            logs: None,
            state,
        }
    }

    /// Run the command loop until quit or shutdown
    pub async fn run(&mut self, mut shutdown: broadcast::Receiver<()>) -> Result<(), ConsoleError> {
        self.banner().await;
        self.sync_alert_feed().await;

        let mut phase_rx = self.state.session.subscribe();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            self.prompt().await?;
            tokio::select! {
                _ = shutdown.recv() => {
                    println!();
                    break;
                }
                changed = phase_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    // The backend rejected the token mid-session. Logout
                    // already tore the views down itself, so only a drop
                    // performed here gets the notice.
                    if *phase_rx.borrow_and_update() == SessionPhase::Anonymous
                        && self.drop_polling_views()
                    {
                        println!("{}", "Session expired. Please log in again.".yellow());
                    }
                }
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    let flow = match self.dispatch(line.trim()).await {
                        Ok(flow) => flow,
                        Err(err) => {
                            self.render_error(&err);
                            Flow::Continue
                        }
                    };
                    self.drain_toasts();
                    if flow == Flow::Quit {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    /// Execute one command line the way the loop does
    pub async fn handle_command(&mut self, line: &str) -> Result<(), ConsoleError> {
        self.dispatch(line.trim()).await.map(|_| ())
    }

    /// Keep the alert badge fed while signed in. The status feed backs both
    /// the prompt badge and the dashboard, so it starts with the session
    /// rather than on the first `dashboard` command.
    async fn sync_alert_feed(&mut self) {
        if self.dashboard.is_none() && self.state.session.is_authenticated().await {
            let subscription = self.state.scheduler.subscribe(PollKey::DeviceStatus);
            self.dashboard = Some(DashboardView::new(subscription));
        }
    }

    /// Detach every scheduler subscription. Returns whether any view was
    /// actually holding one.
    fn drop_polling_views(&mut self) -> bool {
        let had_any = self.dashboard.is_some()
            || self.status.is_some()
            || self.history.is_some()
            || self.logs.is_some();
        self.dashboard = None;
        self.status = None;
        self.history = None;
        self.logs = None;
        self.metrics.unwatch();
        had_any
    }

    async fn banner(&self) {
        println!("{}", "ConfigWeaver console".bold());
        if let Some(username) = self.state.session.username().await {
            println!("Signed in as {}", username.cyan());
        } else {
            println!("Not signed in. Use {} to begin.", "login <user> <pass>".cyan());
        }
        println!("Type {} for commands.", "help".cyan());
    }

    async fn prompt(&mut self) -> Result<(), ConsoleError> {
        let who = self
            .state
            .session
            .username()
            .await
            .unwrap_or_else(|| "anonymous".to_string());

        // Alert badge from the live status feed, when subscribed
        let mut badge = String::new();
        if let Some(view) = self.dashboard.as_mut() {
            view.refresh_latest();
            if let Some(summary) = view.summary() {
                if !summary.all_clear() {
                    badge = format!(" [{} down]", summary.down).red().to_string();
                }
            }
        }

        print!("{}{}> ", who.dimmed(), badge);
        std::io::stdout().flush()?;
        Ok(())
    }

    fn drain_toasts(&self) {
        for toast in self.state.notifier.active() {
            let tag = match toast.severity {
                ToastSeverity::Success => "ok".green(),
                ToastSeverity::Error => "error".red(),
                ToastSeverity::Warning => "warn".yellow(),
                ToastSeverity::Info => "info".blue(),
            };
            println!("  [{}] {}", tag, toast.text);
            self.state.notifier.dismiss(toast.id);
        }
    }

    fn render_error(&self, err: &ConsoleError) {
        match err {
            ConsoleError::Unauthorized => {
                println!("{}", "Session expired. Please log in again.".yellow())
            }
            other => println!("{}", other.to_string().red()),
        }
    }

    fn route_for(command: &str) -> Route {
        match command {
            "login" | "logout" => Route::Login,
            "dashboard" => Route::Dashboard,
            "devices" | "device" => Route::Devices,
            "deploy" | "templates" | "rollback" | "execlog" => Route::Deploy,
            "block" => Route::Security,
            "scripts" | "script" => Route::Scripts,
            "status" | "probe" => Route::Status,
            "metrics" => Route::Metrics,
            "history" => Route::History,
            "logs" => Route::Logs,
            _ => Route::Dashboard,
        }
    }

    async fn dispatch(&mut self, line: &str) -> Result<Flow, ConsoleError> {
        let args: Vec<&str> = line.split_whitespace().collect();
        let Some(&command) = args.first() else {
            return Ok(Flow::Continue);
        };

        match command {
            "help" => {
                self.render_help();
                return Ok(Flow::Continue);
            }
            "quit" | "exit" => return Ok(Flow::Quit),
            "whoami" => {
                match self.state.session.username().await {
                    Some(username) => println!("{}", username),
                    None => println!("anonymous"),
                }
                return Ok(Flow::Continue);
            }
            _ => {}
        }

        let authenticated = self.state.session.is_authenticated().await;
        let route = guard(Self::route_for(command), authenticated);
        if route == Route::Login && command != "login" && command != "logout" {
            println!("{}", "Please log in first.".yellow());
            return Ok(Flow::Continue);
        }

        match command {
            "login" => self.cmd_login(&args).await?,
            "logout" => self.cmd_logout().await,
            "dashboard" => self.cmd_dashboard().await?,
            "devices" => self.cmd_devices().await?,
            "device" => self.cmd_device(&args).await?,
            "templates" => self.cmd_templates(),
            "deploy" => self.cmd_deploy(&args).await?,
            "rollback" => self.deploy.rollback()?,
            "execlog" => self.cmd_execlog(),
            "block" => self.cmd_block(&args).await?,
            "scripts" => self.cmd_scripts().await?,
            "script" => self.cmd_script(&args).await?,
            "status" => self.cmd_status().await?,
            "probe" => self.cmd_probe(&args).await?,
            "metrics" => self.cmd_metrics(&args).await?,
            "history" => self.cmd_history().await?,
            "logs" => self.cmd_logs(&args).await?,
            other => println!("Unknown command '{}'. Type {}.", other, "help".cyan()),
        }
        Ok(Flow::Continue)
    }

    fn render_help(&self) {
        println!("Commands:");
        for (usage, text) in [
            ("login <user> <pass>", "sign in"),
            ("logout", "sign out"),
            ("dashboard", "fleet reachability summary"),
            ("devices", "list managed devices"),
            ("device add <name> <ip> <user> <pass>", "register a device"),
            ("device rm <id>", "remove a device (asks to confirm)"),
            ("templates", "list configuration templates"),
            ("deploy <id> <template> [k=v ...]", "apply a template"),
            ("deploy <id> custom <command...>", "run a raw command"),
            ("rollback", "mark a rollback of the last deployment"),
            ("execlog", "show the deployment execution log"),
            ("block <id> <url>", "block a website from a device"),
            ("scripts", "list server-side scripts"),
            ("script run <id> <name>", "execute a script on a device"),
            ("script log", "this session's script runs"),
            ("status", "live reachability per device"),
            ("probe <id>", "test API connectivity to a device"),
            ("metrics <id>", "resource utilization for a device"),
            ("history", "deployment audit trail"),
            ("logs [level|search <text>|export|clear]", "activity log feed"),
            ("quit", "leave the console"),
        ] {
            println!("  {:<40} {}", usage.cyan(), text);
        }
    }

    async fn cmd_login(&mut self, args: &[&str]) -> Result<(), ConsoleError> {
        let (username, password) = match args {
            [_, username, password] => (*username, *password),
            _ => {
                return Err(ConsoleError::ValidationError(
                    "Usage: login <user> <pass>".to_string(),
                ))
            }
        };
        self.login
            .submit(username, &SecretString::from(password.to_string()))
            .await?;
        self.sync_alert_feed().await;
        Ok(())
    }

    async fn cmd_logout(&mut self) {
        // Polling views hold scheduler subscriptions; drop them with the
        // session.
        self.drop_polling_views();
        self.state.session.invalidate().await;
        println!("Signed out.");
    }

    async fn cmd_dashboard(&mut self) -> Result<(), ConsoleError> {
        if self.dashboard.is_none() {
            let subscription = self.state.scheduler.subscribe(PollKey::DeviceStatus);
            self.dashboard = Some(DashboardView::new(subscription));
        }
        let view = self.dashboard.as_mut().ok_or_else(|| {
            ConsoleError::Internal("dashboard view missing after creation".to_string())
        })?;

        view.refresh_latest();
        if view.summary().is_none() {
            let _ = tokio::time::timeout(FIRST_REPORT_WAIT, view.next_report()).await;
        }
        let Some(summary) = view.summary() else {
            println!("No status report yet.");
            return Ok(());
        };
        println!(
            "Devices: {} up, {} down (as of {})",
            summary.up.to_string().green(),
            summary.down.to_string().red(),
            summary.last_updated.with_timezone(&Local).format("%H:%M:%S")
        );
        if summary.all_clear() {
            println!("{}", "All devices reachable.".green());
        } else {
            for device in &summary.down_devices {
                println!(
                    "  {} {} ({})",
                    "DOWN".red().bold(),
                    device.name,
                    device.ip_address
                );
            }
        }
        Ok(())
    }

    async fn cmd_devices(&mut self) -> Result<(), ConsoleError> {
        self.inventory.refresh().await?;
        if self.inventory.devices().is_empty() {
            println!("No devices registered.");
            return Ok(());
        }
        println!("{:<5} {:<20} {:<16} {}", "ID", "NAME", "ADDRESS", "USER");
        for device in self.inventory.devices() {
            println!(
                "{:<5} {:<20} {:<16} {}",
                device.id, device.name, device.ip_address, device.username
            );
        }
        Ok(())
    }

    async fn cmd_device(&mut self, args: &[&str]) -> Result<(), ConsoleError> {
        match args {
            [_, "add", name, ip, username, password] => {
                let form = NewDeviceForm {
                    name: name.to_string(),
                    ip_address: ip.to_string(),
                    username: username.to_string(),
                    password: SecretString::from(password.to_string()),
                    ..NewDeviceForm::default()
                };
                self.inventory.add(&form).await?;
            }
            [_, "rm", id] => {
                let id = parse_id(id)?;
                self.inventory.request_delete(id);
                println!(
                    "Remove device {}? Type {} to proceed or {} to keep it.",
                    id,
                    "device rm-confirm".cyan(),
                    "device rm-cancel".cyan()
                );
            }
            [_, "rm-confirm"] => self.inventory.confirm_delete().await?,
            [_, "rm-cancel"] => {
                self.inventory.cancel_delete();
                println!("Kept.");
            }
            _ => {
                return Err(ConsoleError::ValidationError(
                    "Usage: device add <name> <ip> <user> <pass> | device rm <id>".to_string(),
                ))
            }
        }
        Ok(())
    }

    fn cmd_templates(&self) {
        println!("{:<18} {:<10} {}", "ID", "CATEGORY", "FIELDS");
        for template in self.state.catalog.templates() {
            let fields: Vec<&str> = template.fields.iter().map(|f| f.name.as_str()).collect();
            println!(
                "{:<18} {:<10} {}",
                template.id,
                template.category,
                fields.join(", ")
            );
        }
    }

    async fn cmd_deploy(&mut self, args: &[&str]) -> Result<(), ConsoleError> {
        let [_, device_id, template_id, rest @ ..] = args else {
            return Err(ConsoleError::ValidationError(
                "Usage: deploy <device-id> <template> [k=v ...]".to_string(),
            ));
        };

        self.deploy.select_device(parse_id(device_id)?);
        self.deploy.select_template(template_id)?;

        if self
            .deploy
            .selected_template()
            .map(|t| t.is_custom())
            .unwrap_or(false)
        {
            self.deploy.set_custom_command(&rest.join(" "));
        } else {
            for pair in rest {
                let (key, value) = pair.split_once('=').ok_or_else(|| {
                    ConsoleError::ValidationError(format!(
                        "Expected key=value, got '{}'",
                        pair
                    ))
                })?;
                self.deploy.set_param(key, value);
            }
        }

        self.deploy.deploy().await?;
        Ok(())
    }

    fn cmd_execlog(&self) {
        let mut empty = true;
        for line in self.deploy.execution_log() {
            println!("{}", line);
            empty = false;
        }
        if empty {
            println!("No deployments yet.");
        }
    }

    async fn cmd_block(&mut self, args: &[&str]) -> Result<(), ConsoleError> {
        match args {
            [_, device_id, url] => {
                self.security
                    .block_website(parse_id(device_id)?, url)
                    .await
            }
            _ => Err(ConsoleError::ValidationError(
                "Usage: block <device-id> <url>".to_string(),
            )),
        }
    }

    async fn cmd_scripts(&mut self) -> Result<(), ConsoleError> {
        self.scripts.refresh().await?;
        for script in self.scripts.scripts() {
            match &script.description {
                Some(description) => println!("{:<24} {}", script.name, description),
                None => println!("{}", script.name),
            }
        }
        Ok(())
    }

    async fn cmd_script(&mut self, args: &[&str]) -> Result<(), ConsoleError> {
        match args {
            [_, "run", device_id, name] => {
                self.scripts.refresh().await?;
                self.scripts.execute(parse_id(device_id)?, name).await
            }
            [_, "log"] => {
                let mut empty = true;
                for run in self.scripts.executions() {
                    println!(
                        "{} device {} {} [{}] {}",
                        run.time.format("%H:%M:%S"),
                        run.device_id,
                        run.script,
                        run.status,
                        run.details
                    );
                    empty = false;
                }
                if empty {
                    println!("No script runs yet.");
                }
                Ok(())
            }
            _ => Err(ConsoleError::ValidationError(
                "Usage: script run <device-id> <name> | script log".to_string(),
            )),
        }
    }

    async fn cmd_status(&mut self) -> Result<(), ConsoleError> {
        if self.status.is_none() {
            let subscription = self.state.scheduler.subscribe(PollKey::DeviceStatus);
            self.status = Some(StatusView::new(
                Arc::clone(&self.state.api),
                Arc::clone(&self.state.notifier),
                subscription,
            ));
        }
        let view = self.status.as_mut().ok_or_else(|| {
            ConsoleError::Internal("status view missing after creation".to_string())
        })?;

        if view.entries().is_empty() {
            let _ = tokio::time::timeout(FIRST_REPORT_WAIT, view.next_report()).await;
        }
        if view.entries().is_empty() {
            println!("No status report yet.");
        }
        for entry in view.entries() {
            let badge = match entry.status {
                LinkStatus::Up => "UP".green(),
                LinkStatus::Down => "DOWN".red().bold(),
            };
            println!("{:<6} {:<20} {}", badge, entry.name, entry.ip_address);
        }
        Ok(())
    }

    async fn cmd_probe(&mut self, args: &[&str]) -> Result<(), ConsoleError> {
        let [_, device_id] = args else {
            return Err(ConsoleError::ValidationError(
                "Usage: probe <device-id>".to_string(),
            ));
        };
        if self.status.is_none() {
            let subscription = self.state.scheduler.subscribe(PollKey::DeviceStatus);
            self.status = Some(StatusView::new(
                Arc::clone(&self.state.api),
                Arc::clone(&self.state.notifier),
                subscription,
            ));
        }
        if let Some(view) = self.status.as_mut() {
            view.test_connection(parse_id(device_id)?).await?;
        }
        Ok(())
    }

    async fn cmd_metrics(&mut self, args: &[&str]) -> Result<(), ConsoleError> {
        let [_, device_id] = args else {
            return Err(ConsoleError::ValidationError(
                "Usage: metrics <device-id>".to_string(),
            ));
        };
        self.metrics.watch(parse_id(device_id)?);
        let snapshot = self.metrics.refresh_now().await?;

        let gauge = |label: &str, percent: u8, band: SeverityBand| {
            let value = format!("{:>3}%", percent);
            let value = match band {
                SeverityBand::Success => value.green(),
                SeverityBand::Warning => value.yellow(),
                SeverityBand::Danger => value.red().bold(),
            };
            println!("{:<8} {}", label, value);
        };
        gauge("CPU", snapshot.cpu_percent, snapshot.cpu_band());
        gauge("Memory", snapshot.memory_percent, snapshot.memory_band());
        gauge("Disk", snapshot.disk_percent, snapshot.disk_band());
        println!(
            "Memory   {} free of {}",
            format_bytes(snapshot.free_memory),
            format_bytes(snapshot.total_memory)
        );
        println!(
            "Disk     {} free of {}",
            format_bytes(snapshot.free_disk),
            format_bytes(snapshot.total_disk)
        );
        println!(
            "{} {} | uptime {}",
            snapshot.board_name, snapshot.version, snapshot.uptime
        );
        if let Some(url) = &self.state.settings.grafana_url {
            println!("Dashboards: {}", url.underline());
        }
        Ok(())
    }

    async fn cmd_history(&mut self) -> Result<(), ConsoleError> {
        if self.history.is_none() {
            let subscription = self.state.scheduler.subscribe(PollKey::ConfigHistory);
            self.history = Some(HistoryView::new(subscription));
        }
        let view = self.history.as_mut().ok_or_else(|| {
            ConsoleError::Internal("history view missing after creation".to_string())
        })?;

        if view.entries().is_empty() {
            let _ = tokio::time::timeout(FIRST_REPORT_WAIT, view.next_report()).await;
        }
        if view.entries().is_empty() {
            println!("No deployments recorded.");
        }
        for entry in view.entries() {
            let status = if entry.status.eq_ignore_ascii_case("success") {
                entry.status.green()
            } else {
                entry.status.red()
            };
            println!(
                "{} device {} {} [{}] {}",
                entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                entry.device_id,
                entry.action_type,
                status,
                entry.details
            );
        }
        Ok(())
    }

    async fn cmd_logs(&mut self, args: &[&str]) -> Result<(), ConsoleError> {
        if self.logs.is_none() {
            let subscription = self.state.scheduler.subscribe(PollKey::ActivityLogs);
            self.logs = Some(LogsView::new(subscription));
        }
        let view = self.logs.as_mut().ok_or_else(|| {
            ConsoleError::Internal("logs view missing after creation".to_string())
        })?;

        match args {
            [_] => {}
            [_, "clear"] => {
                view.clear();
                println!("Cleared.");
                return Ok(());
            }
            [_, "export"] => {
                let file = self.state.layout.exports_dir().path().join(format!(
                    "activity-{}.log",
                    Local::now().format("%Y%m%d-%H%M%S")
                ));
                let file = crate::filesys::file::File::new(file);
                let count = view.export(&file).await?;
                println!("Exported {} entries to {:?}", count, file.path());
                return Ok(());
            }
            [_, "search", rest @ ..] => view.set_search(&rest.join(" ")),
            [_, level] => {
                let level = match *level {
                    "info" => Some(ActivityLevel::Info),
                    "success" => Some(ActivityLevel::Success),
                    "warning" => Some(ActivityLevel::Warning),
                    "error" => Some(ActivityLevel::Error),
                    "all" => None,
                    other => {
                        return Err(ConsoleError::ValidationError(format!(
                            "Unknown level '{}'",
                            other
                        )))
                    }
                };
                view.set_level_filter(level);
            }
            _ => {
                return Err(ConsoleError::ValidationError(
                    "Usage: logs [level|search <text>|export|clear]".to_string(),
                ))
            }
        }

        let have_entries = !view.filtered().is_empty();
        if !have_entries {
            let _ = tokio::time::timeout(FIRST_REPORT_WAIT, view.next_report()).await;
        }
        if view.filtered().is_empty() {
            println!("No activity.");
            return Ok(());
        }
        for entry in view.filtered() {
            let tag = match entry.level {
                ActivityLevel::Info => "info".blue(),
                ActivityLevel::Success => "ok".green(),
                ActivityLevel::Warning => "warn".yellow(),
                ActivityLevel::Error => "error".red(),
            };
            println!(
                "[{}] {} | {} | {}: {}",
                tag,
                entry.timestamp.format("%H:%M:%S"),
                entry.device,
                entry.action,
                entry.message
            );
        }
        Ok(())
    }
}

fn parse_id(input: &str) -> Result<i64, ConsoleError> {
    input
        .parse()
        .map_err(|_| ConsoleError::ValidationError(format!("'{}' is not a device id", input)))
}
