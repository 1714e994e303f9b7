//! Login view

use std::sync::Arc;

use secrecy::SecretString;
use tracing::info;

use crate::authn::session::SessionStore;
use crate::errors::ConsoleError;
use crate::http::ConsoleApi;
use crate::notify::Notifier;

pub struct LoginView {
    api: Arc<dyn ConsoleApi>,
    session: Arc<SessionStore>,
    notifier: Arc<Notifier>,
}

impl LoginView {
    pub fn new(api: Arc<dyn ConsoleApi>, session: Arc<SessionStore>, notifier: Arc<Notifier>) -> Self {
        Self {
            api,
            session,
            notifier,
        }
    }

    /// Exchange credentials for a session
    pub async fn submit(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<(), ConsoleError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ConsoleError::ValidationError(
                "Username is required".to_string(),
            ));
        }

        match self.api.login(username, password).await {
            Ok(token) => {
                self.session
                    .establish(username, SecretString::from(token.access_token))
                    .await?;
                info!("Logged in as {}", username);
                self.notifier.success(format!("Welcome, {}", username));
                Ok(())
            }
            Err(err) => {
                // Rejected credentials come back as a 401; the operator
                // sees one uniform message either way.
                let text = match &err {
                    ConsoleError::Unauthorized
                    | ConsoleError::ApiError { status: 401, .. } => {
                        "Invalid username or password".to_string()
                    }
                    other => other.to_string(),
                };
                self.notifier.error(text);
                Err(err)
            }
        }
    }
}
