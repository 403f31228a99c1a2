//! Threat tier classification.
//!
//! Every view that shows a score goes through [`ThreatTier::from_score`] so the
//! low/medium/high buckets cannot drift between screens.

#[cfg(test)]
#[path = "tier_test.rs"]
mod tier_test;

/// Scores at or above this are `High`.
pub const HIGH_THRESHOLD: f64 = 0.7;
/// Scores at or above this (and below `HIGH_THRESHOLD`) are `Medium`.
pub const MEDIUM_THRESHOLD: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ThreatTier {
    Low,
    Medium,
    High,
}

impl ThreatTier {
    /// Bucket a score in `[0, 1]`. Non-finite scores fall into `Low`.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_THRESHOLD {
            Self::High
        } else if score >= MEDIUM_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for ThreatTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Render a `[0, 1]` score as a percentage with one decimal, e.g. `"12.5%"`.
#[must_use]
pub fn format_percent(score: f64) -> String {
    format!("{:.1}%", score * 100.0)
}
