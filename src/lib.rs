//! Client-side session lifecycle and API gateway for the threat analysis service.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every screen of the service (dashboard, text/image analysis, history,
//! profile, settings) is a thin consumer of two shared pieces:
//!
//! - [`session::SessionStore`] decides whether a user is signed in. Persisted
//!   tokens are the source of truth; the in-memory user is a cache.
//! - [`api::ApiClient`] dispatches every request, attaches the bearer token,
//!   and routes authorization failures through one [`api::AuthInterceptor`].
//!
//! The remaining modules carry the small amount of per-screen logic: form
//! validation and submission guarding ([`forms`]), pagination windows
//! ([`history`]), and score tiers ([`tier`]).

pub mod api;
pub mod config;
pub mod error;
pub mod forms;
pub mod gate;
pub mod history;
pub mod nav;
pub mod session;
pub mod storage;
pub mod tier;
pub mod types;

#[cfg(test)]
mod test_support;

pub use api::{ApiClient, AuthInterceptor};
pub use config::ClientConfig;
pub use error::ApiError;
pub use session::{AuthStatus, SessionStore};
pub use tier::ThreatTier;
