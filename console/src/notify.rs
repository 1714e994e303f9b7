//! Transient operator notifications
//!
//! Any part of the application can post a toast; the shell drains the
//! broadcast channel to render them and the active list lets a renderer
//! show whatever is still within its display window. Expiry is purge-on-
//! read rather than timer-driven.

use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::Instant;
use uuid::Uuid;

/// Visual weight of a toast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastSeverity {
    Success,
    Error,
    Warning,
    Info,
}

impl ToastSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToastSeverity::Success => "success",
            ToastSeverity::Error => "error",
            ToastSeverity::Warning => "warning",
            ToastSeverity::Info => "info",
        }
    }
}

/// One transient notification
#[derive(Debug, Clone)]
pub struct Toast {
    pub id: Uuid,
    pub severity: ToastSeverity,
    pub text: String,
}

struct ActiveToast {
    toast: Toast,
    expires_at: Instant,
}

/// Fan-out point for toasts
pub struct Notifier {
    tx: broadcast::Sender<Toast>,
    active: Mutex<Vec<ActiveToast>>,
    duration: Duration,
}

impl Notifier {
    pub fn new(duration: Duration) -> Self {
        let (tx, _) = broadcast::channel(64);
        Self {
            tx,
            active: Mutex::new(Vec::new()),
            duration,
        }
    }

    /// Receive every toast posted after this call
    pub fn subscribe(&self) -> broadcast::Receiver<Toast> {
        self.tx.subscribe()
    }

    pub fn post(&self, severity: ToastSeverity, text: impl Into<String>) -> Toast {
        let toast = Toast {
            id: Uuid::new_v4(),
            severity,
            text: text.into(),
        };
        {
            let mut active = self.active.lock().unwrap();
            active.push(ActiveToast {
                toast: toast.clone(),
                expires_at: Instant::now() + self.duration,
            });
        }
        // No receivers is fine, the active list still records it
        let _ = self.tx.send(toast.clone());
        toast
    }

    pub fn success(&self, text: impl Into<String>) -> Toast {
        self.post(ToastSeverity::Success, text)
    }

    pub fn error(&self, text: impl Into<String>) -> Toast {
        self.post(ToastSeverity::Error, text)
    }

    pub fn warning(&self, text: impl Into<String>) -> Toast {
        self.post(ToastSeverity::Warning, text)
    }

    pub fn info(&self, text: impl Into<String>) -> Toast {
        self.post(ToastSeverity::Info, text)
    }

    /// Toasts still within their display window, oldest first
    pub fn active(&self) -> Vec<Toast> {
        let now = Instant::now();
        let mut active = self.active.lock().unwrap();
        active.retain(|entry| entry.expires_at > now);
        active.iter().map(|entry| entry.toast.clone()).collect()
    }

    /// Drop a toast before its window elapses
    pub fn dismiss(&self, id: Uuid) {
        let mut active = self.active.lock().unwrap();
        active.retain(|entry| entry.toast.id != id);
    }
}
