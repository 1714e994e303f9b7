//! Session store
//!
//! Exactly one session exists per process. The store is the single owner of
//! the bearer token: every network call site borrows it from here, and only
//! the store may establish or invalidate it. Phase transitions are published
//! over a watch channel so the shell can route back to the login view when
//! the backend rejects the token.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, RwLock};
use tracing::{info, warn};

use crate::errors::ConsoleError;
use crate::filesys::file::File;

/// Whether the console currently holds a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Anonymous,
    Authenticated,
}

/// On-disk shape of the session file
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedSession {
    username: String,
    token: String,
    established_at: u64,
}

struct ActiveSession {
    username: String,
    token: SecretString,
}

/// Single-owner session state, persisted across console restarts
pub struct SessionStore {
    file: File,
    inner: RwLock<Option<ActiveSession>>,
    phase_tx: watch::Sender<SessionPhase>,
}

impl SessionStore {
    /// Load the persisted session, if any
    pub async fn load(file: File) -> Self {
        let inner = if file.exists().await {
            match file.read_json::<PersistedSession>().await {
                Ok(persisted) => Some(ActiveSession {
                    username: persisted.username,
                    token: SecretString::from(persisted.token),
                }),
                Err(e) => {
                    warn!("Discarding unreadable session file: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let phase = if inner.is_some() {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Anonymous
        };
        let (phase_tx, _) = watch::channel(phase);

        Self {
            file,
            inner: RwLock::new(inner),
            phase_tx,
        }
    }

    /// Establish a new session, replacing any existing one
    pub async fn establish(
        &self,
        username: &str,
        token: SecretString,
    ) -> Result<(), ConsoleError> {
        let persisted = PersistedSession {
            username: username.to_string(),
            token: token.expose_secret().to_string(),
            established_at: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        };
        self.file.write_json(&persisted).await?;
        self.file.set_permissions_600().await?;

        let mut inner = self.inner.write().await;
        *inner = Some(ActiveSession {
            username: username.to_string(),
            token,
        });
        self.phase_tx.send_replace(SessionPhase::Authenticated);

        info!("Session established for {}", username);
        Ok(())
    }

    /// Drop the session. Idempotent: repeated invalidations (e.g. a burst of
    /// 401 responses) leave the same end state.
    pub async fn invalidate(&self) {
        {
            let mut inner = self.inner.write().await;
            if inner.is_none() {
                return;
            }
            *inner = None;
        }

        if let Err(e) = self.file.delete().await {
            warn!("Failed to remove session file: {}", e);
        }
        self.phase_tx.send_replace(SessionPhase::Anonymous);
        info!("Session invalidated");
    }

    /// Current bearer token, if authenticated
    pub async fn token(&self) -> Option<SecretString> {
        let inner = self.inner.read().await;
        inner.as_ref().map(|s| s.token.clone())
    }

    /// Username of the active session, if any
    pub async fn username(&self) -> Option<String> {
        let inner = self.inner.read().await;
        inner.as_ref().map(|s| s.username.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.is_some()
    }

    /// Subscribe to phase transitions
    pub fn subscribe(&self) -> watch::Receiver<SessionPhase> {
        self.phase_tx.subscribe()
    }
}
