/// Client transport layer
///
/// `AuthTransport` is the seam between the session coordinator and the
/// wire: production uses the reqwest-backed `HttpTransport`, tests inject
/// fakes. The transport is deliberately dumb — it attaches a bearer token,
/// unwraps the API envelope, and reports failures; all retry/refresh
/// policy lives in the coordinator.

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

use crate::auth::TokenPair;
use crate::error::TOKEN_EXPIRED;

/// Outbound API call, transport-agnostic.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: reqwest::Method,
    pub path: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: reqwest::Method::GET,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: reqwest::Method::POST,
            path: path.into(),
            body: Some(body),
        }
    }

    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: reqwest::Method::PATCH,
            path: path.into(),
            body: Some(body),
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: reqwest::Method::DELETE,
            path: path.into(),
            body: None,
        }
    }
}

/// A failed API call: either the server's error envelope or a transport
/// breakdown (no status at all).
#[derive(Debug, Clone)]
pub struct ApiFailure {
    pub status: Option<u16>,
    pub message: String,
}

impl ApiFailure {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    /// The one retryable failure: 401 carrying the canonical expired-token
    /// message. Any other 401 (bad signature, already-retried request) is
    /// terminal for the session coordinator.
    pub fn is_token_expired(&self) -> bool {
        self.status == Some(401) && self.message == TOKEN_EXPIRED
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "API error {}: {}", status, self.message),
            None => write!(f, "Transport error: {}", self.message),
        }
    }
}

impl std::error::Error for ApiFailure {}

#[async_trait]
pub trait AuthTransport: Send + Sync {
    /// Send one request, optionally with a bearer token. Success yields the
    /// decoded response body (the full envelope, `Null` for empty bodies).
    async fn send(&self, request: &ApiRequest, access_token: Option<&str>)
        -> Result<Value, ApiFailure>;

    /// Exchange a refresh token for a new pair via POST /auth/refresh.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, ApiFailure>;
}

/// reqwest-backed transport talking to a streamhub server.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl AuthTransport for HttpTransport {
    async fn send(
        &self,
        request: &ApiRequest,
        access_token: Option<&str>,
    ) -> Result<Value, ApiFailure> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.http.request(request.method.clone(), url);
        if let Some(token) = access_token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiFailure::transport(e.to_string()))?;

        let status = response.status().as_u16();
        let success = response.status().is_success();
        let text = response
            .text()
            .await
            .map_err(|e| ApiFailure::transport(e.to_string()))?;

        let value = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str::<Value>(&text)
                .map_err(|e| ApiFailure::transport(format!("Malformed response body: {}", e)))?
        };

        if success {
            Ok(value)
        } else {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Unexpected server error")
                .to_string();
            Err(ApiFailure::api(status, message))
        }
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, ApiFailure> {
        let request = ApiRequest::post(
            "/auth/refresh",
            serde_json::json!({ "refreshToken": refresh_token }),
        );
        let value = self.send(&request, None).await?;

        serde_json::from_value::<TokenPair>(value["data"].clone())
            .map_err(|e| ApiFailure::transport(format!("Malformed refresh response: {}", e)))
    }
}
