//! Authenticated JSON client shared by the remote providers.
//!
//! Owns the `reqwest` client, the base URL and the access token, and maps
//! HTTP failures onto the shared error taxonomy.

use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::time::Duration;
use toolgate_core::{Error, ProviderName, Result};

/// Timeout applied to every remote request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How the access token is attached to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Bearer <token>`
    Bearer,
    /// A custom header carrying the raw token
    Header(&'static str),
}

/// JSON API client bound to one provider.
#[derive(Debug)]
pub struct ApiClient {
    provider: ProviderName,
    base_url: Url,
    http: reqwest::Client,
    token: Option<SecretString>,
    token_env: &'static str,
    auth: AuthScheme,
}

impl ApiClient {
    /// Creates a client for `provider` rooted at `base_url`.
    ///
    /// `token_env` names the variable the token comes from and is only used
    /// in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the base URL is invalid or the HTTP
    /// client cannot be built.
    pub fn new(
        provider: ProviderName,
        base_url: &str,
        token: Option<SecretString>,
        token_env: &'static str,
        auth: AuthScheme,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| Error::ConfigError {
            message: format!("invalid base URL '{base_url}' for {provider}: {e}"),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(Error::ConfigError {
                message: format!("base URL '{base_url}' for {provider} cannot carry a path"),
            });
        }

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("toolgate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::ConfigError {
                message: format!("cannot build HTTP client for {provider}: {e}"),
            })?;

        Ok(Self {
            provider,
            base_url,
            http,
            token,
            token_env,
            auth,
        })
    }

    /// Returns `true` if an access token is configured.
    #[must_use]
    pub const fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Returns the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Sends a GET request to the path built from `segments`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn get(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Value> {
        self.send(Method::GET, segments, query, None).await
    }

    /// Sends a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn post(&self, segments: &[&str], body: &Value) -> Result<Value> {
        self.send(Method::POST, segments, &[], Some(body)).await
    }

    /// Sends one authenticated request and decodes the JSON response.
    ///
    /// An empty response body decodes to `null`.
    ///
    /// # Errors
    ///
    /// - [`Error::ProviderUnavailable`] when no token is configured
    /// - [`Error::NotFound`] on 404
    /// - [`Error::PermissionDenied`] on 401 and 403
    /// - [`Error::Remote`] on other failures, including transport errors
    pub async fn send(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let token = self.token.as_ref().ok_or_else(|| Error::ProviderUnavailable {
            provider: self.provider.to_string(),
            reason: format!("{} is not set", self.token_env),
        })?;

        let url = self.url(segments);
        tracing::debug!(provider = %self.provider, %method, path = url.path(), "remote request");

        let mut request = self.http.request(method.clone(), url.clone());
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        let request = self.authorize(request, token);

        let response = request.send().await.map_err(|e| {
            tracing::error!(
                provider = %self.provider,
                %method,
                error = %e,
                "remote request failed"
            );
            self.remote_error(None, e.to_string())
        })?;

        self.decode(url.path(), response).await
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorize(&self, request: RequestBuilder, token: &SecretString) -> RequestBuilder {
        match self.auth {
            AuthScheme::Bearer => request.bearer_auth(token.expose_secret()),
            AuthScheme::Header(name) => request.header(name, token.expose_secret()),
        }
    }

    async fn decode(&self, path: &str, response: Response) -> Result<Value> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.remote_error(Some(status), e.to_string()))?;

        if status.is_success() {
            if text.trim().is_empty() {
                return Ok(Value::Null);
            }
            return serde_json::from_str(&text).map_err(|e| {
                self.remote_error(Some(status), format!("invalid JSON response: {e}"))
            });
        }

        let message = error_message(&text).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
        tracing::error!(
            provider = %self.provider,
            status = status.as_u16(),
            path,
            %message,
            "remote error"
        );

        Err(match status {
            StatusCode::NOT_FOUND => Error::NotFound {
                resource: format!("{} {path}", self.provider),
            },
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::PermissionDenied {
                reason: format!(
                    "{} rejected the request ({}): {message}",
                    self.provider,
                    status.as_u16()
                ),
            },
            _ => self.remote_error(Some(status), message),
        })
    }

    fn remote_error(&self, status: Option<StatusCode>, message: String) -> Error {
        Error::Remote {
            provider: self.provider.to_string(),
            status: status.map(|s| s.as_u16()),
            message,
        }
    }
}

/// Pulls a human-readable message out of an error body.
///
/// GitHub uses `message`, Figma uses `err` (or `message` on newer routes).
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "err", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(token: Option<&str>, base_url: &str) -> ApiClient {
        ApiClient::new(
            ProviderName::new("example"),
            base_url,
            token.map(|t| SecretString::from(t.to_string())),
            "EXAMPLE_TOKEN",
            AuthScheme::Bearer,
        )
        .unwrap()
    }

    #[test]
    fn test_url_segments_are_appended_and_encoded() {
        let api = client(None, "https://api.example.com/v1/");
        let url = api.url(&["files", "a b", "nodes"]);
        assert_eq!(url.as_str(), "https://api.example.com/v1/files/a%20b/nodes");

        let api = client(None, "https://api.example.com");
        assert_eq!(api.url(&["user"]).as_str(), "https://api.example.com/user");
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        let err = ApiClient::new(
            ProviderName::new("example"),
            "not a url",
            None,
            "EXAMPLE_TOKEN",
            AuthScheme::Bearer,
        )
        .unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"message":"Bad credentials"}"#).as_deref(),
            Some("Bad credentials")
        );
        assert_eq!(
            error_message(r#"{"status":400,"err":"Invalid file key"}"#).as_deref(),
            Some("Invalid file key")
        );
        assert_eq!(error_message("<html>"), None);
    }

    #[tokio::test]
    async fn test_missing_token_is_unavailable() {
        let api = client(None, "https://api.example.com");
        assert!(!api.has_token());

        let err = api.get(&["user"], &[]).await.unwrap_err();
        assert!(err.is_unavailable());
        assert!(err.to_string().contains("EXAMPLE_TOKEN is not set"));
    }

    #[tokio::test]
    async fn test_transport_failure_is_remote_error() {
        let api = client(Some("token"), "http://127.0.0.1:9");

        let err = api.get(&["user"], &[]).await.unwrap_err();
        assert!(err.is_remote_error());
    }

    #[test]
    fn test_remote_error_carries_status_code() {
        let api = client(Some("token"), "https://api.example.com");

        let err = api.remote_error(Some(StatusCode::BAD_GATEWAY), "upstream down".to_string());
        match err {
            Error::Remote {
                provider,
                status,
                message,
            } => {
                assert_eq!(provider, "example");
                assert_eq!(status, Some(502));
                assert_eq!(message, "upstream down");
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(matches!(
            api.remote_error(None, "timeout".to_string()),
            Error::Remote { status: None, .. }
        ));
    }
}
