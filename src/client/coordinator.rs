/// Session coordinator with single-flight refresh.
///
/// Guarantees at most one outstanding refresh call no matter how many
/// requests fail with the expired-token signal concurrently. The in-flight
/// flag and the waiter queue form one logical unit guarded by one mutex;
/// the enqueue-or-become-refresher decision is a single critical section
/// and the lock is never held across an await. Every waiter is resolved
/// exactly once — with the new access token or with a terminal rejection.

use std::sync::{Arc, Mutex};

use serde_json::Value;
use std::fmt;
use tokio::sync::oneshot;

use super::tokens::TokenStore;
use super::transport::{ApiFailure, ApiRequest, AuthTransport};
use crate::auth::TokenPair;

/// Failures surfaced to callers of `AuthClient::request`.
#[derive(Debug, Clone)]
pub enum ClientError {
    /// The refresh path failed. Stored credentials are already cleared and
    /// the session is over; the caller must re-authenticate.
    SessionExpired,
    /// Any non-retryable API or transport failure, passed through.
    Api(ApiFailure),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::SessionExpired => write!(f, "Session expired, please log in again"),
            ClientError::Api(failure) => write!(f, "{}", failure),
        }
    }
}

impl std::error::Error for ClientError {}

type RefreshOutcome = Result<String, ClientError>;

struct RefreshState {
    refreshing: bool,
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
}

pub struct AuthClient {
    transport: Arc<dyn AuthTransport>,
    tokens: TokenStore,
    state: Mutex<RefreshState>,
}

impl AuthClient {
    pub fn new(transport: Arc<dyn AuthTransport>) -> Self {
        Self {
            transport,
            tokens: TokenStore::new(),
            state: Mutex::new(RefreshState {
                refreshing: false,
                waiters: Vec::new(),
            }),
        }
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// POST /auth/login and store the issued pair on success.
    pub async fn login(&self, email: &str, password: &str) -> Result<Value, ClientError> {
        let request = ApiRequest::post(
            "/auth/login",
            serde_json::json!({ "email": email, "password": password }),
        );
        let value = self
            .transport
            .send(&request, None)
            .await
            .map_err(ClientError::Api)?;

        let pair = serde_json::from_value::<TokenPair>(value["data"]["tokens"].clone())
            .map_err(|e| {
                ClientError::Api(ApiFailure::transport(format!(
                    "Malformed login response: {}",
                    e
                )))
            })?;
        self.tokens.store(pair);

        Ok(value)
    }

    pub fn logout(&self) {
        self.tokens.clear();
    }

    /// Send a request with the stored access token, transparently riding
    /// out token expiry.
    ///
    /// On the expired-token signal the request joins the single-flight
    /// refresh and is then retried exactly once with the fresh token. The
    /// retry's outcome is returned as-is, so a second 401 — expired or not —
    /// propagates and can never re-enter the refresh path. Failures other
    /// than the expired signal propagate immediately.
    pub async fn request(&self, request: ApiRequest) -> Result<Value, ClientError> {
        let access = self.tokens.access_token();
        match self.transport.send(&request, access.as_deref()).await {
            Ok(value) => Ok(value),
            Err(failure) if failure.is_token_expired() => {
                let token = self.fresh_access_token().await?;
                self.transport
                    .send(&request, Some(&token))
                    .await
                    .map_err(ClientError::Api)
            }
            Err(failure) => Err(ClientError::Api(failure)),
        }
    }

    /// Join or start the single-flight refresh and return the new access
    /// token.
    async fn fresh_access_token(&self) -> RefreshOutcome {
        let waiter = {
            let mut state = self.state.lock().unwrap();
            if state.refreshing {
                let (tx, rx) = oneshot::channel();
                state.waiters.push(tx);
                Some(rx)
            } else {
                state.refreshing = true;
                None
            }
        };

        if let Some(rx) = waiter {
            // suspended until the in-flight refresher resolves every waiter
            return match rx.await {
                Ok(outcome) => outcome,
                // sender dropped: the refresher died before resolving us
                Err(_) => Err(ClientError::SessionExpired),
            };
        }

        let outcome = self.run_refresh().await;

        let waiters = {
            let mut state = self.state.lock().unwrap();
            state.refreshing = false;
            std::mem::take(&mut state.waiters)
        };
        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }

        outcome
    }

    async fn run_refresh(&self) -> RefreshOutcome {
        let refresh_token = match self.tokens.refresh_token() {
            Some(token) => token,
            None => {
                self.tokens.clear();
                return Err(ClientError::SessionExpired);
            }
        };

        match self.transport.refresh(&refresh_token).await {
            Ok(pair) => {
                let access = pair.access_token.clone();
                self.tokens.store(pair);
                tracing::debug!("Session refreshed");
                Ok(access)
            }
            Err(failure) => {
                // terminal: forced logout, no further retries
                tracing::warn!(error = %failure, "Session refresh failed, logging out");
                self.tokens.clear();
                Err(ClientError::SessionExpired)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{TOKEN_EXPIRED, TOKEN_INVALID};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const STALE: &str = "stale-access";
    const FRESH: &str = "fresh-access";

    /// Transport whose protected calls fail with the expired signal until
    /// the refreshed token is presented. The refresh call is slowed down so
    /// concurrent callers pile up behind the in-flight refresh.
    struct FakeTransport {
        refresh_calls: AtomicUsize,
        refresh_fails: bool,
        always_expired: bool,
    }

    impl FakeTransport {
        fn new() -> Self {
            Self {
                refresh_calls: AtomicUsize::new(0),
                refresh_fails: false,
                always_expired: false,
            }
        }

        fn failing_refresh() -> Self {
            Self {
                refresh_fails: true,
                ..Self::new()
            }
        }

        fn never_satisfied() -> Self {
            Self {
                always_expired: true,
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl AuthTransport for FakeTransport {
        async fn send(
            &self,
            _request: &ApiRequest,
            access_token: Option<&str>,
        ) -> Result<Value, ApiFailure> {
            if !self.always_expired && access_token == Some(FRESH) {
                Ok(serde_json::json!({ "success": true }))
            } else {
                Err(ApiFailure::api(401, TOKEN_EXPIRED))
            }
        }

        async fn refresh(&self, _refresh_token: &str) -> Result<TokenPair, ApiFailure> {
            self.refresh_calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(100)).await;
            if self.refresh_fails {
                Err(ApiFailure::api(401, TOKEN_INVALID))
            } else {
                Ok(TokenPair {
                    access_token: FRESH.to_string(),
                    refresh_token: "fresh-refresh".to_string(),
                })
            }
        }
    }

    fn stale_client(transport: Arc<FakeTransport>) -> Arc<AuthClient> {
        let client = Arc::new(AuthClient::new(transport));
        client.tokens().store(TokenPair {
            access_token: STALE.to_string(),
            refresh_token: "stale-refresh".to_string(),
        });
        client
    }

    #[tokio::test]
    async fn concurrent_expiries_share_a_single_refresh() {
        let transport = Arc::new(FakeTransport::new());
        let client = stale_client(transport.clone());

        let mut handles = Vec::new();
        for i in 0..8 {
            let client = client.clone();
            handles.push(tokio::spawn(async move {
                client.request(ApiRequest::get(format!("/auth/resource/{}", i))).await
            }));
        }

        for handle in handles {
            let result = handle.await.unwrap();
            assert!(result.is_ok(), "every waiter must resolve: {:?}", result);
        }

        assert_eq!(transport.refresh_calls.load(Ordering::SeqCst), 1);
        assert_eq!(client.tokens().access_token().as_deref(), Some(FRESH));
    }

    #[tokio::test]
    async fn failed_refresh_rejects_every_waiter_and_logs_out() {
        let transport = Arc::new(FakeTransport::failing_refresh());
        let client = stale_client(transport.clone());

        let mut handles = Vec::new();
        for _ in 0..5 {
            let client = client.clone();
            handles.push(tokio::spawn(async move {
                client.request(ApiRequest::get("/auth/me")).await
            }));
        }

        for handle in handles {
            let result = handle.await.unwrap();
            assert!(
                matches!(result, Err(ClientError::SessionExpired)),
                "uniform terminal failure expected: {:?}",
                result
            );
        }

        assert_eq!(transport.refresh_calls.load(Ordering::SeqCst), 1);
        // forced logout: no credentials left
        assert!(client.tokens().access_token().is_none());
        assert!(client.tokens().refresh_token().is_none());
    }

    #[tokio::test]
    async fn non_expiry_401_bypasses_the_refresh_path() {
        struct InvalidTokenTransport {
            refresh_calls: AtomicUsize,
        }

        #[async_trait]
        impl AuthTransport for InvalidTokenTransport {
            async fn send(
                &self,
                _request: &ApiRequest,
                _access_token: Option<&str>,
            ) -> Result<Value, ApiFailure> {
                Err(ApiFailure::api(401, TOKEN_INVALID))
            }

            async fn refresh(&self, _refresh_token: &str) -> Result<TokenPair, ApiFailure> {
                self.refresh_calls.fetch_add(1, Ordering::SeqCst);
                unreachable!("refresh must not be attempted for a non-expiry 401");
            }
        }

        let transport = Arc::new(InvalidTokenTransport {
            refresh_calls: AtomicUsize::new(0),
        });
        let client = AuthClient::new(transport.clone());
        client.tokens().store(TokenPair {
            access_token: STALE.to_string(),
            refresh_token: "stale-refresh".to_string(),
        });

        let result = client.request(ApiRequest::get("/auth/me")).await;
        assert!(matches!(result, Err(ClientError::Api(f)) if f.message == TOKEN_INVALID));
        assert_eq!(transport.refresh_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn a_retried_request_never_refreshes_twice() {
        // expiry persists even after a successful refresh; the retry's 401
        // must propagate instead of spawning another refresh
        let transport = Arc::new(FakeTransport::never_satisfied());
        let client = stale_client(transport.clone());

        let result = client.request(ApiRequest::get("/auth/me")).await;

        assert!(matches!(result, Err(ClientError::Api(f)) if f.is_token_expired()));
        assert_eq!(transport.refresh_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn refresh_without_stored_credentials_is_terminal() {
        let transport = Arc::new(FakeTransport::new());
        let client = AuthClient::new(transport.clone());

        // no stored tokens: the fake reports expiry, and the refresh path
        // must short-circuit before ever calling the transport
        let result = client.request(ApiRequest::get("/auth/me")).await;
        assert!(matches!(result, Err(ClientError::SessionExpired)));
        assert_eq!(transport.refresh_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn the_flag_clears_so_a_later_expiry_can_refresh_again() {
        let transport = Arc::new(FakeTransport::new());
        let client = stale_client(transport.clone());

        assert!(client.request(ApiRequest::get("/auth/me")).await.is_ok());
        assert_eq!(transport.refresh_calls.load(Ordering::SeqCst), 1);

        // simulate the next expiry cycle
        client.tokens().store(TokenPair {
            access_token: STALE.to_string(),
            refresh_token: "stale-refresh".to_string(),
        });

        assert!(client.request(ApiRequest::get("/auth/me")).await.is_ok());
        assert_eq!(transport.refresh_calls.load(Ordering::SeqCst), 2);
    }
}
