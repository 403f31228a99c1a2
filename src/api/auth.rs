//! Login, registration and logout.

use super::{ApiClient, Endpoint};
use crate::error::ApiError;
use crate::types::{AuthResponse, RegisterRequest, User};

impl ApiClient {
    /// Exchange credentials for tokens via `POST /auth/login` (form-encoded)
    /// and start a session.
    ///
    /// Returns the signed-in user when the profile could be loaded.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for blank credentials (no request is sent), or the
    /// login request's failure.
    pub async fn login(&self, email: &str, password: &str) -> Result<Option<User>, ApiError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(ApiError::validation("Please enter your email and password"));
        }
        let request = self.request(Endpoint::Login).form(&[("username", email), ("password", password)]);
        let response: AuthResponse = self.fetch_json(Endpoint::Login, request).await?;
        self.start_session(Endpoint::Login, response).await
    }

    /// Create an account via `POST /auth/register` and start a session.
    ///
    /// # Errors
    ///
    /// Returns the registration request's failure.
    pub async fn register(&self, body: &RegisterRequest) -> Result<Option<User>, ApiError> {
        let request = self.request(Endpoint::Register).json(body);
        let response: AuthResponse = self.fetch_json(Endpoint::Register, request).await?;
        self.start_session(Endpoint::Register, response).await
    }

    /// Notify the server, then clear the session and navigate to login
    /// whatever the server said.
    ///
    /// # Errors
    ///
    /// Returns the logout request's failure after the session is cleared.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let result = self.dispatch(Endpoint::Logout, self.request(Endpoint::Logout)).await;
        // A 401 has already been through the interceptor.
        if !matches!(result, Err(ApiError::AuthFailure { .. })) {
            self.interceptor.end_session();
        }
        result.map(|_| ())
    }

    async fn start_session(&self, endpoint: Endpoint, response: AuthResponse) -> Result<Option<User>, ApiError> {
        if response.access_token.is_empty() {
            return Err(ApiError::Decode {
                endpoint: endpoint.label(),
                reason: "empty access_token".to_owned(),
            });
        }
        let tokens = response.tokens();
        if let Some(user) = response.user {
            self.session.set_session(&tokens, Some(user.clone()))?;
            tracing::info!(user_id = %user.id, "signed in");
            return Ok(Some(user));
        }

        self.session.set_session(&tokens, None)?;
        match self.current_user().await {
            Ok(user) => {
                self.session.set_session(&tokens, Some(user.clone()))?;
                tracing::info!(user_id = %user.id, "signed in");
                Ok(Some(user))
            }
            Err(e @ ApiError::AuthFailure { .. }) => Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "signed in but profile fetch failed");
                Ok(None)
            }
        }
    }
}
