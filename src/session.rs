//! Auth-session state for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Consulted by every protected command to decide whether to proceed or send
//! the user to login.
//!
//! DESIGN
//! ======
//! The store is a dumb cache over [`KeyValueStore`]. It never checks token
//! expiry; liveness is decided lazily by the API client's response handling.
//! Mutation is limited to [`SessionStore::restore`],
//! [`SessionStore::set_session`] and [`SessionStore::clear`], each idempotent
//! or last-write-wins.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::{Arc, RwLock};

use crate::error::{ApiError, StorageError};
use crate::storage::{ACCESS_TOKEN_KEY, KeyValueStore, REFRESH_TOKEN_KEY};
use crate::types::{TokenPair, User};

/// Where the app stands on "is someone signed in".
///
/// `Loading` lasts until [`SessionStore::restore`] settles, so a guard never
/// sees a false "unauthenticated" during startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthStatus {
    Loading,
    Authenticated,
    Unauthenticated,
}

/// Source of the current user's profile, consulted during restore.
#[async_trait::async_trait]
pub trait ProfileFetcher: Send + Sync {
    async fn fetch_profile(&self) -> Result<User, ApiError>;
}

#[derive(Debug)]
struct SessionState {
    status: AuthStatus,
    user: Option<User>,
    last_error: Option<String>,
}

pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    state: RwLock<SessionState>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").field("state", &self.state).finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            state: RwLock::new(SessionState { status: AuthStatus::Loading, user: None, last_error: None }),
        }
    }

    /// Decide the initial auth state at startup.
    ///
    /// With no persisted access token this settles immediately without
    /// calling `profiles`. Otherwise the profile fetch decides: success
    /// authenticates, any failure clears the persisted tokens.
    pub async fn restore<P>(&self, profiles: &P) -> AuthStatus
    where
        P: ProfileFetcher + ?Sized,
    {
        if self.access_token().is_none() {
            tracing::debug!("no persisted access token");
            self.write_state(|state| {
                state.status = AuthStatus::Unauthenticated;
                state.user = None;
            });
            return AuthStatus::Unauthenticated;
        }

        match profiles.fetch_profile().await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "session restored");
                self.write_state(|state| {
                    state.status = AuthStatus::Authenticated;
                    state.user = Some(user);
                    state.last_error = None;
                });
                AuthStatus::Authenticated
            }
            Err(e) => {
                tracing::warn!(error = %e, "session restore failed; clearing tokens");
                self.clear();
                self.write_state(|state| state.last_error = Some(e.to_string()));
                AuthStatus::Unauthenticated
            }
        }
    }

    /// Persist `tokens` and cache `user`. Called after login or registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the tokens could not be persisted; the in-memory
    /// state is left unchanged in that case.
    pub fn set_session(&self, tokens: &TokenPair, user: Option<User>) -> Result<(), StorageError> {
        self.storage.set(ACCESS_TOKEN_KEY, &tokens.access_token)?;
        self.storage.set(REFRESH_TOKEN_KEY, &tokens.refresh_token)?;
        self.write_state(|state| {
            state.status = AuthStatus::Authenticated;
            state.user = user;
            state.last_error = None;
        });
        Ok(())
    }

    /// Remove persisted tokens and the cached user. Safe to call repeatedly.
    ///
    /// Returns `true` if anything was actually removed.
    pub fn clear(&self) -> bool {
        let mut removed = false;
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
            match self.storage.remove(key) {
                Ok(was_present) => removed |= was_present,
                Err(e) => tracing::warn!(key, error = %e, "failed to remove session token"),
            }
        }
        let had_user = self.write_state(|state| {
            state.status = AuthStatus::Unauthenticated;
            state.user.take().is_some()
        });
        if removed || had_user {
            tracing::info!("session cleared");
        }
        removed || had_user
    }

    /// True iff a non-empty access token is persisted. Does not check validity.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.storage.get(ACCESS_TOKEN_KEY).filter(|token| !token.is_empty())
    }

    #[must_use]
    pub fn tokens(&self) -> Option<TokenPair> {
        let access_token = self.access_token()?;
        let refresh_token = self.storage.get(REFRESH_TOKEN_KEY).unwrap_or_default();
        Some(TokenPair { access_token, refresh_token })
    }

    #[must_use]
    pub fn status(&self) -> AuthStatus {
        self.read_state(|state| state.status)
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.read_state(|state| state.user.clone())
    }

    /// Message from the most recent failed restore, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.read_state(|state| state.last_error.clone())
    }

    fn read_state<T>(&self, f: impl FnOnce(&SessionState) -> T) -> T {
        let state = self.state.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&state)
    }

    fn write_state<T>(&self, f: impl FnOnce(&mut SessionState) -> T) -> T {
        let mut state = self.state.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut state)
    }
}
