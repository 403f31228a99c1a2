//! Navigation targets and the unauthenticated-redirect guard.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every protected view applies the same guard, and the API client's 401
//! handling navigates through the same [`Navigator`] sink, so there is one
//! place that decides where a signed-out user lands.

#[cfg(test)]
#[path = "nav_test.rs"]
mod nav_test;

use crate::session::AuthStatus;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    TextAnalysis,
    ImageAnalysis,
    History,
    Profile,
    Settings,
}

impl Route {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Dashboard => "/dashboard",
            Self::TextAnalysis => "/text-analysis",
            Self::ImageAnalysis => "/image-analysis",
            Self::History => "/history",
            Self::Profile => "/profile",
            Self::Settings => "/settings",
        }
    }

    /// Unknown paths (and `/`) land on the dashboard.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "/login" => Self::Login,
            "/register" => Self::Register,
            "/text-analysis" => Self::TextAnalysis,
            "/image-analysis" => Self::ImageAnalysis,
            "/history" => Self::History,
            "/profile" => Self::Profile,
            "/settings" => Self::Settings,
            _ => Self::Dashboard,
        }
    }

    #[must_use]
    pub fn is_protected(self) -> bool {
        !matches!(self, Self::Login | Self::Register)
    }
}

/// Sink for application-wide navigation side effects.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Outcome of guarding a route against the current auth status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Restore has not settled; show a loading state.
    Wait,
    Render,
    Redirect(Route),
}

#[must_use]
pub fn guard(route: Route, status: AuthStatus) -> GuardDecision {
    if !route.is_protected() {
        return GuardDecision::Render;
    }
    match status {
        AuthStatus::Loading => GuardDecision::Wait,
        AuthStatus::Authenticated => GuardDecision::Render,
        AuthStatus::Unauthenticated => GuardDecision::Redirect(Route::Login),
    }
}
