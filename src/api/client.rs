//! API client for the Vikmo dealer sales backend.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! requests against the order-management REST API. Every request
//! carries the stored access token as a bearer header; a 401 response
//! triggers the refresh-and-retry protocol: one refresh of the access
//! token, then one retry of the original request, never more.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::auth::{keepalive, CredentialStore, KeepaliveHandle};
use crate::models::User;

use super::RefreshError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Period of the background keepalive loop in seconds.
/// 4 minutes renews the access token well inside its server-side lifetime.
const KEEPALIVE_PERIOD_SECS: u64 = 240;

/// Login endpoint path (never routed through the retry wrapper)
const LOGIN_PATH: &str = "/auth/login/";

/// Refresh endpoint path
const REFRESH_PATH: &str = "/auth/refresh/";

/// Current-user endpoint path
const ME_PATH: &str = "/auth/me/";

#[derive(Debug, Deserialize)]
struct LoginTokens {
    access: String,
    refresh: String,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
}

/// Result of a single logical API call.
///
/// Errors are carried as values: `status` is `None` when the request
/// could not be sent at all, and `body` is `None` when the response
/// payload was empty or not valid JSON. Nothing in this layer panics or
/// surfaces a transport error directly, so callers branch on the same
/// shape every time.
#[derive(Debug, Clone)]
pub struct ApiOutcome {
    pub status: Option<StatusCode>,
    pub body: Option<Value>,
}

impl ApiOutcome {
    async fn read(response: Response) -> Self {
        let status = response.status();
        let body = response.json::<Value>().await.ok();
        Self {
            status: Some(status),
            body,
        }
    }

    fn unsent() -> Self {
        Self {
            status: None,
            body: None,
        }
    }

    fn rejected(status: StatusCode, detail: &str) -> Self {
        Self {
            status: Some(status),
            body: Some(json!({ "detail": detail })),
        }
    }

    /// Whether the response carried a 2xx status
    pub fn is_success(&self) -> bool {
        self.status.is_some_and(|s| s.is_success())
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(StatusCode::UNAUTHORIZED)
    }

    /// Human-readable error message from the response body, if any
    pub fn detail(&self) -> Option<&str> {
        self.body.as_ref()?.get("detail")?.as_str()
    }

    /// Deserialize the body into a typed model
    pub fn parse<T: DeserializeOwned>(&self) -> Option<T> {
        serde_json::from_value(self.body.clone()?).ok()
    }
}

/// API client for the Vikmo backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    store: CredentialStore,
}

impl ApiClient {
    /// Create a new API client against the given base URL, the prefix
    /// shared by all endpoints (e.g. `http://localhost:8000/api`).
    pub fn new(base_url: impl Into<String>, store: CredentialStore) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            store,
        })
    }

    /// The credential store this client reads tokens from
    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    // ===== Generic resource operations =====

    pub async fn get(&self, path: &str) -> ApiOutcome {
        self.request(Method::GET, path, None).await
    }

    pub async fn post<B: Serialize>(&self, path: &str, body: &B) -> ApiOutcome {
        match serde_json::to_value(body) {
            Ok(payload) => self.request(Method::POST, path, Some(&payload)).await,
            Err(e) => {
                warn!(path, error = %e, "failed to serialize request body");
                ApiOutcome::unsent()
            }
        }
    }

    pub async fn put<B: Serialize>(&self, path: &str, body: &B) -> ApiOutcome {
        match serde_json::to_value(body) {
            Ok(payload) => self.request(Method::PUT, path, Some(&payload)).await,
            Err(e) => {
                warn!(path, error = %e, "failed to serialize request body");
                ApiOutcome::unsent()
            }
        }
    }

    /// Update a draft order.
    ///
    /// The `status` field is server-immutable through this endpoint;
    /// payloads carrying one are rejected client-side with the same 400
    /// result the server would produce, without a network call. Status
    /// changes go through [`confirm_order`](Self::confirm_order),
    /// [`cancel_order`](Self::cancel_order) and
    /// [`deliver_order`](Self::deliver_order).
    pub async fn put_order<B: Serialize>(&self, id: i64, body: &B) -> ApiOutcome {
        let payload = match serde_json::to_value(body) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(order_id = id, error = %e, "failed to serialize order payload");
                return ApiOutcome::unsent();
            }
        };
        if payload.get("status").is_some() {
            return ApiOutcome::rejected(
                StatusCode::BAD_REQUEST,
                "Order status cannot be changed via update; use confirm or deliver endpoints",
            );
        }
        self.request(Method::PUT, &format!("/orders/{}/", id), Some(&payload))
            .await
    }

    // ===== Order state transitions =====

    /// Confirm a draft order, deducting stock server-side
    pub async fn confirm_order(&self, id: i64) -> ApiOutcome {
        self.post(&format!("/orders/{}/confirm/", id), &json!({})).await
    }

    /// Cancel a draft order
    pub async fn cancel_order(&self, id: i64) -> ApiOutcome {
        self.post(&format!("/orders/{}/cancel/", id), &json!({})).await
    }

    /// Mark a confirmed order as delivered
    pub async fn deliver_order(&self, id: i64) -> ApiOutcome {
        self.post(&format!("/orders/{}/deliver/", id), &json!({})).await
    }

    /// Adjust the stock level of an inventory record (admin only)
    pub async fn adjust_inventory(&self, id: i64, change: i64, note: &str) -> ApiOutcome {
        self.put(
            &format!("/inventory/{}/adjust/", id),
            &json!({ "change": change, "note": note }),
        )
        .await
    }

    // ===== Session operations =====

    /// Authenticate and persist the returned token pair.
    ///
    /// Login bypasses the retry wrapper: a 401 here means bad
    /// credentials, which a refresh cannot fix. The raw outcome is
    /// returned so callers can surface the server's `detail` message.
    pub async fn login(&self, username: &str, password: &str) -> ApiOutcome {
        let body = json!({ "username": username, "password": password });
        let outcome = match self.send_once(Method::POST, LOGIN_PATH, Some(&body)).await {
            Ok(response) => ApiOutcome::read(response).await,
            Err(e) => {
                warn!(error = %e, "login request could not be sent");
                ApiOutcome::unsent()
            }
        };

        if outcome.status == Some(StatusCode::OK) {
            if let Some(tokens) = outcome.parse::<LoginTokens>() {
                self.store.set_session(&tokens.access, &tokens.refresh);
                debug!(username, "login succeeded, session stored");
            }
        }
        outcome
    }

    /// Discard the stored session.
    ///
    /// Purely client-side, matching the backend's stateless JWT logout;
    /// callers should also stop their keepalive loop.
    pub fn logout(&self) {
        self.store.clear();
        debug!("session cleared");
    }

    /// Fetch the authenticated account.
    ///
    /// `Ok(None)` means "not logged in": the request came back 401 and
    /// the refresh protocol could not recover. Other failures are
    /// reported as errors so callers can tell a broken server apart
    /// from a missing session.
    pub async fn current_user(&self) -> Result<Option<User>> {
        let outcome = self.request(Method::GET, ME_PATH, None).await;
        match outcome.status {
            Some(status) if status.is_success() => Ok(outcome.parse::<User>()),
            Some(StatusCode::UNAUTHORIZED) => Ok(None),
            Some(status) => Err(anyhow::anyhow!(
                "current-user request failed with status {}",
                status
            )),
            None => Err(anyhow::anyhow!("current-user request could not be sent")),
        }
    }

    // ===== Refresh protocol =====

    /// Exchange the stored refresh token for a new access token.
    ///
    /// Fail-closed: every failure path, including a missing refresh
    /// token, leaves the store empty. Concurrent invocations (a
    /// keepalive tick racing a 401 retry) are permitted; the last
    /// successful write wins, and a failure from either caller ends the
    /// session.
    pub async fn try_refresh(&self) -> Result<(), RefreshError> {
        let Some(refresh) = self.store.refresh() else {
            self.store.clear();
            return Err(RefreshError::MissingToken);
        };

        let url = format!("{}{}", self.base_url, REFRESH_PATH);
        let response = match self
            .client
            .post(&url)
            .json(&json!({ "refresh": refresh }))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                self.store.clear();
                return Err(RefreshError::Network(e));
            }
        };

        if response.status() != StatusCode::OK {
            let status = response.status();
            self.store.clear();
            return Err(RefreshError::Rejected(status));
        }

        match response.json::<RefreshResponse>().await {
            Ok(renewed) => {
                self.store.set_access(&renewed.access);
                debug!("access token refreshed");
                Ok(())
            }
            Err(_) => {
                self.store.clear();
                Err(RefreshError::MalformedResponse)
            }
        }
    }

    // ===== Keepalive =====

    /// Start the background session keepalive loop.
    ///
    /// Every few minutes the loop refreshes the access token; if a
    /// refresh fails, `on_session_lost` fires exactly once and the loop
    /// ends. At most one loop should run per authenticated session;
    /// starting a second without stopping the first duplicates refresh
    /// traffic. Requires a running tokio runtime.
    pub fn start_keepalive<F>(&self, on_session_lost: F) -> KeepaliveHandle
    where
        F: FnOnce() + Send + 'static,
    {
        self.start_keepalive_with_period(
            Duration::from_secs(KEEPALIVE_PERIOD_SECS),
            on_session_lost,
        )
    }

    /// Keepalive loop with a caller-chosen period, for short-lived
    /// sessions and tests
    pub fn start_keepalive_with_period<F>(
        &self,
        period: Duration,
        on_session_lost: F,
    ) -> KeepaliveHandle
    where
        F: FnOnce() + Send + 'static,
    {
        keepalive::spawn(self.clone(), period, on_session_lost)
    }

    // ===== Request wrapper =====

    /// Issue one authenticated request under the retry-once rule: a 401
    /// triggers at most one refresh and at most one retry, and a failed
    /// refresh returns the original 401 untouched.
    async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> ApiOutcome {
        let response = match self.send_once(method.clone(), path, body).await {
            Ok(response) => response,
            Err(e) => {
                warn!(path, error = %e, "request could not be sent");
                return ApiOutcome::unsent();
            }
        };

        if response.status() != StatusCode::UNAUTHORIZED {
            return ApiOutcome::read(response).await;
        }

        match self.try_refresh().await {
            Ok(()) => {
                debug!(path, "retrying with refreshed access token");
                match self.send_once(method, path, body).await {
                    Ok(retry) => ApiOutcome::read(retry).await,
                    Err(e) => {
                        warn!(path, error = %e, "retry could not be sent");
                        ApiOutcome::unsent()
                    }
                }
            }
            Err(e) => {
                debug!(path, error = %e, "refresh failed, returning original 401");
                ApiOutcome::read(response).await
            }
        }
    }

    async fn send_once(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> reqwest::Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method, &url);
        if let Some(token) = self.store.access() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        request.send().await
    }
}
