//! HTTP client implementation
//!
//! One configured client for the whole console. Every request borrows the
//! bearer token from the session store; every response passes through the
//! same status handling: 401 invalidates the session, 503 and network
//! failures are logged as transient notices, everything else is converted to
//! a user-facing detail string and handed back to the caller unchanged.

use std::sync::Arc;

use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::authn::session::SessionStore;
use crate::errors::ConsoleError;

/// HTTP client for backend communication
pub struct HttpClient {
    client: Client,
    base_url: Url,
    session: Arc<SessionStore>,
}

impl HttpClient {
    /// Create a new HTTP client against a fixed base URL
    pub fn new(base_url: &str, session: Arc<SessionStore>) -> Result<Self, ConsoleError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ConsoleError::ConfigError(format!("Invalid base URL: {}", e)))?;

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url,
            session,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    /// Attach the bearer token when a session exists; anonymous otherwise
    async fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token().await {
            Some(token) => request.header(
                header::AUTHORIZATION,
                format!("Bearer {}", token.expose_secret()),
            ),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ConsoleError> {
        match request.send().await {
            Ok(response) => Ok(response),
            Err(e) => {
                warn!("Network error: no response received from backend: {}", e);
                Err(ConsoleError::NetworkError(e))
            }
        }
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<T, ConsoleError> {
        let status = response.status();
        if status.is_success() {
            let body = response.text().await?;
            return decode_body(&body);
        }

        let body = response.text().await.unwrap_or_default();
        Err(self.error_for_status(status, &body).await)
    }

    async fn error_for_status(&self, status: StatusCode, body: &str) -> ConsoleError {
        if status == StatusCode::UNAUTHORIZED {
            warn!("Session rejected by backend, signing out");
            self.session.invalidate().await;
            return ConsoleError::Unauthorized;
        }

        if status == StatusCode::SERVICE_UNAVAILABLE {
            warn!("Service unavailable: backend might be starting up");
        }

        ConsoleError::ApiError {
            status: status.as_u16(),
            detail: detail_from_body(status.as_u16(), body),
        }
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ConsoleError> {
        let url = self.endpoint(path);
        debug!("GET {}", url);

        let request = self.authorize(self.client.get(&url)).await;
        let response = self.send(request).await?;
        self.handle_response(response).await
    }

    /// Make a POST request with a JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ConsoleError> {
        let url = self.endpoint(path);
        debug!("POST {}", url);

        let request = self.authorize(self.client.post(&url)).await.json(body);
        let response = self.send(request).await?;
        self.handle_response(response).await
    }

    /// Make a POST request with a JSON body and query parameters
    pub async fn post_with_query<T: DeserializeOwned, B: Serialize, Q: Serialize>(
        &self,
        path: &str,
        query: &Q,
        body: &B,
    ) -> Result<T, ConsoleError> {
        let url = self.endpoint(path);
        debug!("POST {}", url);

        let request = self
            .authorize(self.client.post(&url))
            .await
            .query(query)
            .json(body);
        let response = self.send(request).await?;
        self.handle_response(response).await
    }

    /// Make a POST request with an empty body
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ConsoleError> {
        let url = self.endpoint(path);
        debug!("POST {}", url);

        let request = self.authorize(self.client.post(&url)).await;
        let response = self.send(request).await?;
        self.handle_response(response).await
    }

    /// Make a POST request with a form-encoded body
    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<T, ConsoleError> {
        let url = self.endpoint(path);
        debug!("POST {} (form)", url);

        let request = self.authorize(self.client.post(&url)).await.form(form);
        let response = self.send(request).await?;
        self.handle_response(response).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> Result<(), ConsoleError> {
        let url = self.endpoint(path);
        debug!("DELETE {}", url);

        let request = self.authorize(self.client.delete(&url)).await;
        let response = self.send(request).await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(self.error_for_status(status, &body).await)
    }
}

/// Decode a successful response body. A body the console cannot parse is a
/// deserialization failure, not a transport failure.
fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, ConsoleError> {
    Ok(serde_json::from_str(body)?)
}

/// Extract the user-facing detail from an error body.
///
/// The backend reports errors as `{"detail": ...}` where detail is either a
/// plain string or a nested `{message, errors, suggestion}` object.
pub fn detail_from_body(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        match value.get("detail") {
            Some(serde_json::Value::String(s)) => return s.clone(),
            Some(serde_json::Value::Object(obj)) => {
                let mut out = obj
                    .get("message")
                    .and_then(|m| m.as_str())
                    .unwrap_or("Request failed")
                    .to_string();
                if let Some(errors) = obj.get("errors").and_then(|e| e.as_array()) {
                    let joined = errors
                        .iter()
                        .filter_map(|e| e.as_str())
                        .collect::<Vec<_>>()
                        .join(", ");
                    if !joined.is_empty() {
                        out = format!("{}: {}", out, joined);
                    }
                }
                if let Some(suggestion) = obj.get("suggestion").and_then(|s| s.as_str()) {
                    out = format!("{} {}", out, suggestion);
                }
                return out;
            }
            _ => {}
        }
    }

    if body.trim().is_empty() {
        format!("HTTP {}", status)
    } else {
        body.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_plain_string() {
        let body = r#"{"detail": "Device not found"}"#;
        assert_eq!(detail_from_body(404, body), "Device not found");
    }

    #[test]
    fn detail_nested_object() {
        let body = r#"{"detail": {"message": "Validation failed", "errors": ["Ping check failed", "Port closed"], "suggestion": "Use skip validation."}}"#;
        assert_eq!(
            detail_from_body(400, body),
            "Validation failed: Ping check failed, Port closed Use skip validation."
        );
    }

    #[test]
    fn detail_fallback_on_empty_body() {
        assert_eq!(detail_from_body(500, ""), "HTTP 500");
    }

    #[test]
    fn detail_fallback_on_plain_text() {
        assert_eq!(detail_from_body(502, "Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn unparseable_success_body_is_a_json_error() {
        let err = decode_body::<weaver_models::TokenResponse>(r#"{"unexpected": true}"#)
            .err()
            .unwrap();
        assert!(matches!(err, ConsoleError::JsonError(_)));
        assert!(!err.to_string().contains("No response received"));
    }
}
