use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to generate dashboard insights for a user
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GenerateInsightsRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
}

/// Health check request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthRequest;
