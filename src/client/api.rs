//! JSON API client over the resolved origin.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resolution::{ApiBaseResolver, ResolveError};
use crate::resolver::OriginError;

/// Errors surfaced to API callers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("cannot reach server: {0}")]
    Network(String),

    #[error("invalid request: {0}")]
    Request(String),

    #[error("server returned {status}: {message}")]
    Status {
        status: u16,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error(transparent)]
    Url(#[from] OriginError),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl ApiError {
    /// Worth retrying later (backend unreachable or connection dropped).
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Resolve(_) | ApiError::Network(_))
    }
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: String,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
}

/// Body returned by `POST /auth/login`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: LoginUser,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginUser {
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Sends requests to `<resolved origin><api_prefix><path>`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    resolver: ApiBaseResolver,
    http: Client,
    prefix: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(resolver: ApiBaseResolver) -> Result<Self, ApiError> {
        let config = resolver.config();
        let http = Client::builder()
            .timeout(Duration::from_secs(config.client.request_timeout_secs))
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;
        Ok(Self {
            resolver,
            http,
            prefix: config.client.api_prefix.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn resolver(&self) -> &ApiBaseResolver {
        &self.resolver
    }

    /// `<origin><api_prefix>` for the currently resolved origin.
    pub async fn base_url(&self) -> Result<String, ApiError> {
        let origin = self.resolver.resolve().await?;
        Ok(format!("{}{}", origin, self.prefix))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path).await?;
        self.send(self.http.get(url)).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path).await?;
        self.send(self.http.post(url).json(body)).await
    }

    /// Authenticate; the email is trimmed and lower-cased first.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        role: Option<&str>,
    ) -> Result<LoginResponse, ApiError> {
        let request = LoginRequest {
            email: email.trim().to_lowercase(),
            password,
            role,
        };
        tracing::info!(email = %request.email, "Attempting login");

        let response: LoginResponse = self.post_json("/auth/login", &request).await?;
        tracing::info!(roles = ?response.user.roles, "Login successful");
        Ok(response)
    }

    async fn url(&self, path: &str) -> Result<url::Url, ApiError> {
        let origin = self.resolver.resolve().await?;
        let path = path.trim_start_matches('/');
        Ok(origin.join(&format!("{}/{}", self.prefix, path))?)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let builder = match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) if e.is_connect() || e.is_timeout() || e.is_request() => {
                tracing::error!(error = %e, "No response from server");
                // The cached origin may have moved; probe again next time.
                self.resolver.invalidate();
                return Err(ApiError::Network(e.to_string()));
            }
            Err(e) => {
                tracing::error!(error = %e, "Request could not be sent");
                return Err(ApiError::Request(e.to_string()));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let details = serde_json::from_str::<serde_json::Value>(&text).ok();
            let message = details
                .as_ref()
                .and_then(|d| d.get("detail"))
                .and_then(|d| d.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                });
            tracing::warn!(status = status.as_u16(), %message, "API request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
                details,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}
