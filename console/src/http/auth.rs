//! Authentication API client

use secrecy::{ExposeSecret, SecretString};
use weaver_models::TokenResponse;

use crate::errors::ConsoleError;
use crate::http::client::HttpClient;

impl HttpClient {
    /// Exchange credentials for a bearer token
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<TokenResponse, ConsoleError> {
        self.post_form(
            "/auth/token",
            &[("username", username), ("password", password.expose_secret())],
        )
        .await
    }
}
