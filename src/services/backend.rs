use crate::core::{InsightSource, SourceError};
use crate::models::{BudgetRange, Profile, Property, RoommateCandidate};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to the platform backend
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Aggregate dashboard stats as served by the backend. `core` composes
/// these with the request date into a `DashboardContext`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(rename = "averagePropertyPrice", default)]
    pub average_property_price: Option<f64>,
    #[serde(rename = "propertyCount", default)]
    pub property_count: u64,
    #[serde(rename = "marketplaceCount", default)]
    pub marketplace_count: u64,
}

#[derive(Debug, Deserialize)]
struct PropertySearchPage {
    #[serde(default)]
    properties: Vec<Property>,
}

#[derive(Debug, Deserialize)]
struct CandidatePage {
    #[serde(default)]
    candidates: Vec<RoommateCandidate>,
}

/// HTTP client for the platform backend (the persistence layer the
/// pipeline treats as an external collaborator):
/// - fetching user profiles and dashboard stats
/// - budget-filtered property search
/// - roommate candidate search
pub struct BackendClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl BackendClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        what: &str,
    ) -> Result<T, BackendError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("Fetching {} from: {}", what, url);

        let response = self
            .client
            .get(&url)
            .header("X-Synapse-Key", &self.api_key)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(BackendError::Unauthorized)
            }
            StatusCode::NOT_FOUND => {
                return Err(BackendError::NotFound(what.to_string()));
            }
            status if !status.is_success() => {
                return Err(BackendError::ApiError(format!(
                    "Failed to fetch {}: {}",
                    what, status
                )));
            }
            _ => {}
        }

        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::InvalidResponse(format!("{}: {}", what, e)))
    }

    /// Fetch the normalized profile for a user.
    pub async fn get_profile(&self, user_id: &str) -> Result<Profile, BackendError> {
        let path = format!("/users/{}/profile", urlencoding::encode(user_id));
        self.get_json(&path, "profile").await
    }

    /// Fetch aggregate dashboard stats.
    pub async fn get_dashboard_stats(&self) -> Result<DashboardStats, BackendError> {
        self.get_json("/stats/dashboard", "dashboard stats").await
    }

    /// Budget-filtered property search. The backend pre-filters to
    /// available listings and pre-sorts by relevance.
    pub async fn search_properties(
        &self,
        budget: &BudgetRange,
        limit: usize,
    ) -> Result<Vec<Property>, BackendError> {
        let mut query = format!("status=available&limit={}", limit);
        if let Some(min) = budget.min {
            query.push_str(&format!("&minPrice={:.0}", min));
        }
        if let Some(max) = budget.max {
            query.push_str(&format!("&maxPrice={:.0}", max));
        }
        let path = format!("/properties/search?{}", query);
        let page: PropertySearchPage = self.get_json(&path, "property search").await?;
        Ok(page.properties)
    }

    /// Broad roommate candidate search, excluding the requesting user and
    /// non-production accounts.
    pub async fn search_candidates(
        &self,
        exclude_user_id: &str,
        limit: usize,
    ) -> Result<Vec<RoommateCandidate>, BackendError> {
        let path = format!(
            "/roommates/candidates?excludeUserId={}&includeTest=false&limit={}",
            urlencoding::encode(exclude_user_id),
            limit
        );
        let page: CandidatePage = self.get_json(&path, "candidate search").await?;
        Ok(page.candidates)
    }
}

impl InsightSource for BackendClient {
    async fn find_housing_candidates(
        &self,
        budget: &BudgetRange,
    ) -> Result<Vec<Property>, SourceError> {
        self.search_properties(budget, 5)
            .await
            .map_err(|e| SourceError::Lookup(e.to_string()))
    }

    async fn find_roommate_candidates(
        &self,
        exclude_user_id: &str,
    ) -> Result<Vec<RoommateCandidate>, SourceError> {
        self.search_candidates(exclude_user_id, 50)
            .await
            .map_err(|e| SourceError::Lookup(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn search_properties_parses_page() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/properties/search")
            .match_query(mockito::Matcher::Regex("maxPrice=600".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"properties":[{"id":"p1","title":"Room near campus","price":550.0}]}"#,
            )
            .create_async()
            .await;

        let client = BackendClient::new(server.url(), "test-key".to_string());
        let budget = BudgetRange {
            min: None,
            max: Some(600.0),
        };
        let properties = client.search_properties(&budget, 5).await.unwrap();

        mock.assert_async().await;
        assert_eq!(properties.len(), 1);
        assert_eq!(properties[0].id, "p1");
        assert!(properties[0].available);
    }

    #[tokio::test]
    async fn unauthorized_is_surfaced_distinctly() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Any)
            .with_status(401)
            .create_async()
            .await;

        let client = BackendClient::new(server.url(), "bad-key".to_string());
        let err = client.get_dashboard_stats().await.unwrap_err();
        assert!(matches!(err, BackendError::Unauthorized));
    }

    #[tokio::test]
    async fn candidate_search_encodes_user_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/roommates/candidates")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("excludeUserId".into(), "user/1".into()),
                mockito::Matcher::UrlEncoded("limit".into(), "50".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"candidates":[]}"#)
            .create_async()
            .await;

        let client = BackendClient::new(server.url(), "test-key".to_string());
        let candidates = client.search_candidates("user/1", 50).await.unwrap();

        mock.assert_async().await;
        assert!(candidates.is_empty());
    }
}
