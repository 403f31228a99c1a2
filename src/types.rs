//! Typed request/response shapes for the threat analysis API.
//!
//! DESIGN
//! ======
//! Each endpoint decodes into an explicit type here instead of passing
//! untyped JSON to consumers. Optional server fields default rather than fail
//! so older deployments still decode; score ranges are checked by
//! [`DetectionResult::validate`] before a result reaches a screen.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Deserializer, Serialize};

use crate::tier::ThreatTier;

// =============================================================================
// AUTH
// =============================================================================

/// Access/refresh token pair persisted as the session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Body returned by `POST /auth/login` and `POST /auth/register`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Some deployments embed the profile; otherwise it is fetched separately.
    #[serde(default)]
    pub user: Option<User>,
}

impl AuthResponse {
    #[must_use]
    pub fn tokens(&self) -> TokenPair {
        TokenPair { access_token: self.access_token.clone(), refresh_token: self.refresh_token.clone() }
    }
}

/// Body of `POST /auth/register`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

// =============================================================================
// USERS
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl User {
    /// Best human-readable name: full name, then username, then email.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.username.as_deref().filter(|s| !s.trim().is_empty()))
            .unwrap_or(&self.email)
    }
}

/// Partial update for `PUT /users/me`. Absent fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_password: Option<String>,
}

impl UserUpdate {
    #[must_use]
    pub fn password_change(current_password: String, new_password: String) -> Self {
        Self { current_password: Some(current_password), new_password: Some(new_password), ..Self::default() }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// =============================================================================
// DETECTION
// =============================================================================

/// Server-computed outcome of a text or image analysis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    #[serde(default, deserialize_with = "optional_id_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "optional_id_string")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub detection_type: Option<String>,
    #[serde(default)]
    pub content_path: Option<String>,
    pub threat_score: f64,
    pub confidence_score: f64,
    #[serde(default)]
    pub threat_category: String,
    #[serde(default)]
    pub analysis_results: AnalysisDetails,
    #[serde(default)]
    pub remediation_suggestions: Remediation,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl DetectionResult {
    #[must_use]
    pub fn tier(&self) -> ThreatTier {
        ThreatTier::from_score(self.threat_score)
    }

    /// Reject scores outside `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns a description of the first out-of-range score.
    pub fn validate(&self) -> Result<(), String> {
        check_unit("threat_score", self.threat_score)?;
        check_unit("confidence_score", self.confidence_score)
    }
}

fn check_unit(field: &str, value: f64) -> Result<(), String> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{field} {value} outside [0, 1]"))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisDetails {
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub indicators: Vec<String>,
    /// Model-specific fields passed through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remediation {
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default)]
    pub priority: Option<String>,
}

// =============================================================================
// DASHBOARD
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub total_detections: u64,
    #[serde(default)]
    pub recent_threats: SeverityCounts,
    #[serde(default)]
    pub threat_categories: CategoryCounts,
    #[serde(default)]
    pub detection_history: Vec<DailyCount>,
}

/// Server-side severity buckets. These are the dashboard's own aggregation
/// and are distinct from the client-side [`ThreatTier`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    #[serde(default)]
    pub critical: u64,
    #[serde(default)]
    pub high: u64,
    #[serde(default)]
    pub moderate: u64,
    #[serde(default)]
    pub low: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    #[serde(default)]
    pub phishing: u64,
    #[serde(default)]
    pub malware: u64,
    #[serde(default)]
    pub spam: u64,
    #[serde(default)]
    pub suspicious: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    /// ISO date, e.g. `2024-03-01`.
    pub date: String,
    pub count: u64,
}

/// Row of `GET /dashboard/recent`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionSummary {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub threat_score: f64,
    #[serde(default)]
    pub threat_category: String,
    #[serde(default)]
    pub detection_type: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl DetectionSummary {
    #[must_use]
    pub fn tier(&self) -> ThreatTier {
        ThreatTier::from_score(self.threat_score)
    }
}

// =============================================================================
// IDS
// =============================================================================

/// Row ids are integers on some deployments and strings on others.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(text) => text,
            RawId::Number(number) => number.to_string(),
        }
    }
}

fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    RawId::deserialize(deserializer).map(String::from)
}

fn optional_id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<RawId>::deserialize(deserializer)?.map(String::from))
}
