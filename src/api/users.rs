//! Current-user profile endpoints.

use super::{ApiClient, Endpoint};
use crate::error::ApiError;
use crate::types::{User, UserUpdate};

impl ApiClient {
    /// Fetch the signed-in user from `GET /users/me`.
    ///
    /// # Errors
    ///
    /// Returns the request failure or a decode error.
    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.fetch_json(Endpoint::CurrentUser, self.request(Endpoint::CurrentUser)).await
    }

    /// Apply a partial update via `PUT /users/me`, including an optional
    /// password change. The session's cached user is replaced on success.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an empty update (no request is sent), or the
    /// request failure.
    pub async fn update_profile(&self, update: &UserUpdate) -> Result<User, ApiError> {
        if update.is_empty() {
            return Err(ApiError::validation("Nothing to update"));
        }
        let request = self.request(Endpoint::UpdateProfile).json(update);
        let user: User = self.fetch_json(Endpoint::UpdateProfile, request).await?;
        if let Some(tokens) = self.session.tokens() {
            self.session.set_session(&tokens, Some(user.clone()))?;
        }
        tracing::info!(user_id = %user.id, "profile updated");
        Ok(user)
    }

    /// Delete the account via `DELETE /users/me`, then end the session.
    ///
    /// # Errors
    ///
    /// Returns the request failure; the session is left intact unless the
    /// failure was an authorization rejection.
    pub async fn delete_account(&self) -> Result<(), ApiError> {
        self.dispatch(Endpoint::DeleteAccount, self.request(Endpoint::DeleteAccount)).await?;
        tracing::info!("account deleted");
        self.interceptor.end_session();
        Ok(())
    }
}
