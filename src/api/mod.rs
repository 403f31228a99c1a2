//! REST gateway for the threat analysis API.
//!
//! ARCHITECTURE
//! ============
//! Every call goes through [`ApiClient::dispatch`], which layers two
//! behaviors onto the request:
//!
//! - decoration: the persisted access token is attached as a bearer
//!   credential when present. Nothing else about the request is changed.
//! - interception: a 401 is handed to [`AuthInterceptor`], which clears the
//!   session and navigates to login before the failure is returned. Other
//!   failures carry the server's `detail` message, or a per-endpoint fallback.
//!
//! Endpoint families live in sibling modules as `impl ApiClient` blocks.
//!
//! ERROR HANDLING
//! ==============
//! A single request moves `Pending -> Success | AuthFailure | Rejected`.
//! Only `AuthFailure` has effects outside the request itself.

mod auth;
mod dashboard;
mod detection;
mod interceptor;
mod users;


use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use detection::{EMPTY_TEXT_MESSAGE, ImageUpload, MISSING_IMAGE_MESSAGE, UNSUPPORTED_IMAGE_MESSAGE};
pub use interceptor::AuthInterceptor;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::nav::Navigator;
use crate::session::SessionStore;

// =============================================================================
// ENDPOINTS
// =============================================================================

/// Every operation the client performs, with its route and fallback message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    Login,
    Register,
    Logout,
    CurrentUser,
    UpdateProfile,
    DeleteAccount,
    DashboardStats,
    RecentDetections,
    AnalyzeText,
    AnalyzeImage,
    ListDetections,
}

impl Endpoint {
    #[must_use]
    pub fn method(self) -> Method {
        match self {
            Self::Login | Self::Register | Self::Logout | Self::AnalyzeText | Self::AnalyzeImage => Method::POST,
            Self::CurrentUser | Self::DashboardStats | Self::RecentDetections | Self::ListDetections => Method::GET,
            Self::UpdateProfile => Method::PUT,
            Self::DeleteAccount => Method::DELETE,
        }
    }

    /// Path relative to the versioned API base.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/auth/login",
            Self::Register => "/auth/register",
            Self::Logout => "/auth/logout",
            Self::CurrentUser | Self::UpdateProfile | Self::DeleteAccount => "/users/me",
            Self::DashboardStats => "/dashboard/stats",
            Self::RecentDetections => "/dashboard/recent",
            Self::AnalyzeText => "/detection/analyze/text",
            Self::AnalyzeImage => "/detection/analyze/image",
            Self::ListDetections => "/detection",
        }
    }

    /// Shown when the server gives no usable message.
    #[must_use]
    pub fn fallback_message(self) -> &'static str {
        match self {
            Self::Login => "Failed to login",
            Self::Register => "Failed to register",
            Self::Logout => "Failed to logout",
            Self::CurrentUser => "Failed to fetch profile",
            Self::UpdateProfile => "Failed to update profile",
            Self::DeleteAccount => "Failed to delete account",
            Self::DashboardStats => "Failed to fetch dashboard stats",
            Self::RecentDetections => "Failed to fetch recent detections",
            Self::AnalyzeText => "Failed to analyze text",
            Self::AnalyzeImage => "Failed to analyze image",
            Self::ListDetections => "Failed to fetch detections",
        }
    }

    /// Log label, e.g. `"GET /users/me"`.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Login => "POST /auth/login",
            Self::Register => "POST /auth/register",
            Self::Logout => "POST /auth/logout",
            Self::CurrentUser => "GET /users/me",
            Self::UpdateProfile => "PUT /users/me",
            Self::DeleteAccount => "DELETE /users/me",
            Self::DashboardStats => "GET /dashboard/stats",
            Self::RecentDetections => "GET /dashboard/recent",
            Self::AnalyzeText => "POST /detection/analyze/text",
            Self::AnalyzeImage => "POST /detection/analyze/image",
            Self::ListDetections => "GET /detection",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
    interceptor: AuthInterceptor,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient").field("base_url", &self.base_url).finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Build a client bound to `session`; auth failures navigate via `navigator`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(
        config: &ClientConfig,
        session: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .user_agent(concat!("threatscope/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        let interceptor = AuthInterceptor::new(session.clone(), navigator);
        Ok(Self { http, base_url: config.api_base_url.clone(), session, interceptor })
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, endpoint: Endpoint) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, endpoint.path());
        self.http.request(endpoint.method(), url)
    }

    fn decorate(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.access_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request and apply the response policy.
    async fn dispatch(&self, endpoint: Endpoint, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = match self.decorate(request).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(%endpoint, error = %e, "request failed before a response");
                return Err(ApiError::Request { status: None, message: endpoint.fallback_message().to_owned() });
            }
        };

        let status = response.status();
        if status.is_success() {
            tracing::debug!(%endpoint, status = status.as_u16(), "request ok");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body).unwrap_or_else(|| endpoint.fallback_message().to_owned());

        if status == StatusCode::UNAUTHORIZED {
            self.interceptor.on_auth_failure(endpoint);
            return Err(ApiError::AuthFailure { message });
        }

        tracing::warn!(%endpoint, status = status.as_u16(), %message, "request rejected");
        Err(ApiError::Request { status: Some(status.as_u16()), message })
    }

    /// Dispatch and decode a JSON success body.
    async fn fetch_json<T: DeserializeOwned>(&self, endpoint: Endpoint, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.dispatch(endpoint, request).await?;
        let bytes = response.bytes().await.map_err(|e| {
            tracing::warn!(%endpoint, error = %e, "response body read failed");
            ApiError::Request { status: None, message: endpoint.fallback_message().to_owned() }
        })?;
        decode_body(endpoint, &bytes)
    }
}

#[async_trait::async_trait]
impl crate::session::ProfileFetcher for ApiClient {
    async fn fetch_profile(&self) -> Result<crate::types::User, ApiError> {
        self.current_user().await
    }
}

// =============================================================================
// RESPONSE HELPERS
// =============================================================================

fn decode_body<T: DeserializeOwned>(endpoint: Endpoint, bytes: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(bytes).map_err(|e| ApiError::Decode { endpoint: endpoint.label(), reason: e.to_string() })
}

/// Pull a human-readable message out of an error body.
///
/// Understands `{"detail": "..."}`, validation lists of the form
/// `{"detail": [{"msg": "..."}]}`, and `{"message": "..."}`.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail") {
        Some(Value::String(detail)) if !detail.trim().is_empty() => return Some(detail.clone()),
        Some(Value::Array(items)) => {
            let messages: Vec<&str> = items.iter().filter_map(|item| item.get("msg").and_then(Value::as_str)).collect();
            if !messages.is_empty() {
                return Some(messages.join("; "));
            }
        }
        _ => {}
    }
    value
        .get("message")
        .and_then(Value::as_str)
        .filter(|message| !message.trim().is_empty())
        .map(str::to_owned)
}
