//! Dashboard aggregates.

use super::{ApiClient, Endpoint};
use crate::error::ApiError;
use crate::types::{DashboardStats, DetectionSummary};

impl ApiClient {
    /// Fetch tier/category counts and the 7-day history from `GET /dashboard/stats`.
    ///
    /// # Errors
    ///
    /// Returns the request failure or a decode error.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.fetch_json(Endpoint::DashboardStats, self.request(Endpoint::DashboardStats)).await
    }

    /// Fetch the latest detections from `GET /dashboard/recent`.
    ///
    /// # Errors
    ///
    /// Returns the request failure or a decode error.
    pub async fn recent_detections(&self) -> Result<Vec<DetectionSummary>, ApiError> {
        self.fetch_json(Endpoint::RecentDetections, self.request(Endpoint::RecentDetections)).await
    }
}
