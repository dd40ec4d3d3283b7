use crate::core::{generate_insights, PipelineConfig};
use crate::models::{
    DashboardContext, ErrorResponse, GenerateInsightsRequest, HealthResponse, InsightsResponse,
};
use crate::services::{BackendClient, BackendError};
use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<BackendClient>,
    pub pipeline: PipelineConfig,
}

/// Configure all insight-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/insights/generate", web::post().to(generate));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let backend_healthy = state.backend.get_dashboard_stats().await.is_ok();
    let status = if backend_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Generate dashboard insights for a user
///
/// POST /api/v1/insights/generate
///
/// Request body:
/// ```json
/// { "userId": "string" }
/// ```
///
/// Always returns HTTP 200 once the profile is loaded: pipeline trouble
/// degrades to the generic fallback insight, never to an error response.
async fn generate(
    state: web::Data<AppState>,
    req: web::Json<GenerateInsightsRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for generate request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let user_id = &req.user_id;
    let request_id = uuid::Uuid::new_v4();
    tracing::info!("Generating insights for user: {} (request {})", user_id, request_id);

    // The profile is the request's identity; without it there is nothing
    // to generate against.
    let profile = match state.backend.get_profile(user_id).await {
        Ok(profile) => profile,
        Err(BackendError::NotFound(_)) => {
            return HttpResponse::NotFound().json(ErrorResponse {
                error: "Profile not found".to_string(),
                message: format!("No profile for user {}", user_id),
                status_code: 404,
            });
        }
        Err(e) => {
            tracing::error!("Failed to fetch profile for {}: {}", user_id, e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch user profile".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    // Dashboard stats are ambient context; proceed with defaults if the
    // lookup fails rather than failing the request.
    let stats = match state.backend.get_dashboard_stats().await {
        Ok(stats) => stats,
        Err(e) => {
            tracing::warn!(
                "Failed to fetch dashboard stats for {}, proceeding without: {}",
                user_id,
                e
            );
            Default::default()
        }
    };

    let context = DashboardContext {
        average_property_price: stats.average_property_price,
        property_count: stats.property_count,
        marketplace_count: stats.marketplace_count,
        today: chrono::Utc::now().date_naive(),
    };

    let outcome = generate_insights(&profile, &context, state.backend.as_ref(), &state.pipeline).await;

    tracing::info!(
        "Returning {} insights for user {} (request {}, fallback: {})",
        outcome.insights.len(),
        user_id,
        request_id,
        outcome.fallback
    );

    HttpResponse::Ok().json(InsightsResponse {
        success: true,
        insights: outcome.insights,
        categories: outcome.categories,
        fallback: outcome.fallback.then_some(true),
    })
}
