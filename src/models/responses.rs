use crate::models::domain::{Category, Insight};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Response for the insight-generation endpoint. This is the only artifact
/// the dashboard UI depends on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsResponse {
    pub success: bool,
    pub insights: Vec<Insight>,
    /// Per-category counts of the returned insights.
    pub categories: BTreeMap<Category, usize>,
    /// Set (true) only when the pipeline degraded to the generic fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
