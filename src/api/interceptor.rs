//! Response policy for authorization failures.

use std::sync::Arc;

use super::Endpoint;
use crate::nav::{Navigator, Route};
use crate::session::SessionStore;

/// Tears down the session and sends the app to login.
///
/// Applied once per 401 response, whichever endpoint produced it, and by
/// explicit sign-out paths (logout, account deletion).
#[derive(Clone)]
pub struct AuthInterceptor {
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl AuthInterceptor {
    pub fn new(session: Arc<SessionStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self { session, navigator }
    }

    pub fn on_auth_failure(&self, endpoint: Endpoint) {
        tracing::warn!(%endpoint, "authorization rejected; ending session");
        self.end_session();
    }

    pub fn end_session(&self) {
        self.session.clear();
        self.navigator.navigate(Route::Login);
    }
}
