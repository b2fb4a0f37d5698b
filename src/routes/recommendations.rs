use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::core::{predictor_batch, Recommender};
use crate::models::{
    Diagnostics, ErrorResponse, HealthResponse, PredictionOutcome, PropertyListResponse,
    RecommendRequest, RecommendResponse,
};
use crate::services::{Catalog, PredictorClient};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    /// `None` when no prediction service is configured
    pub predictor: Option<Arc<PredictorClient>>,
    pub recommender: Recommender,
}

/// Configure all recommendation-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/recommendations", web::post().to(recommend))
        .route("/properties", web::get().to(list_properties))
        .route("/properties/{id}", web::get().to(get_property));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let predictor = match &state.predictor {
        Some(client) => match client.health_check().await {
            Ok(true) => "ok",
            Ok(false) => "unreachable",
            Err(e) => {
                tracing::debug!("Price model health check failed: {}", e);
                "unreachable"
            }
        },
        None => "disabled",
    };

    let status = if predictor == "ok" { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        catalog_size: state.catalog.len(),
        predictor: predictor.to_string(),
    })
}

/// Recommendations endpoint
///
/// POST /api/v1/recommendations
///
/// Request body:
/// ```json
/// {
///   "budget": 600000,
///   "minBedrooms": 2,
///   "preferredAreas": ["Austin, TX"],
///   "maxCommuteTime": 30,
///   "excludeIds": ["string"]
/// }
/// ```
async fn recommend(
    state: web::Data<AppState>,
    req: web::Json<RecommendRequest>,
) -> impl Responder {
    // Validate request
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for recommendations request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let request_id = uuid::Uuid::new_v4().to_string();
    let candidates = state.catalog.candidates(&req.exclude_ids);

    tracing::info!(
        "Recommendation request {}: {} candidates ({} excluded)",
        request_id,
        candidates.len(),
        state.catalog.len() - candidates.len()
    );

    let predictions = match &state.predictor {
        Some(client) => client.predict(&predictor_batch(&candidates)).await,
        None => PredictionOutcome::Skipped {
            reason: "price model not configured".to_string(),
        },
    };

    let result = state
        .recommender
        .recommend(&req.preferences, &candidates, &predictions);

    if let Some(message) = &result.ml_fallback_message {
        tracing::info!("Request {} degraded to rule scores: {}", request_id, message);
    }

    let response = RecommendResponse {
        request_id,
        recommendations: result.results,
        ml_used: result.ml_used,
        ml_fallback_detected: result.ml_fallback_detected,
        ml_fallback_message: result.ml_fallback_message,
        diagnostics: Diagnostics {
            total_properties: result.total_properties,
            properties_with_ml_scores: result.properties_with_ml_scores,
        },
        generated_at: chrono::Utc::now(),
    };

    tracing::info!(
        "Returning {} recommendations for request {} ({} with model scores)",
        response.recommendations.len(),
        response.request_id,
        response.diagnostics.properties_with_ml_scores
    );

    HttpResponse::Ok().json(response)
}

/// List the whole catalog
///
/// GET /api/v1/properties
async fn list_properties(state: web::Data<AppState>) -> impl Responder {
    let properties = state.catalog.properties().to_vec();
    HttpResponse::Ok().json(PropertyListResponse {
        total: properties.len(),
        properties,
    })
}

/// Fetch one property
///
/// GET /api/v1/properties/{id}
async fn get_property(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let id = path.into_inner();
    match state.catalog.get(&id) {
        Some(property) => HttpResponse::Ok().json(property),
        None => HttpResponse::NotFound().json(ErrorResponse {
            error: "Property not found".to_string(),
            message: format!("No property with id {}", id),
            status_code: 404,
        }),
    }
}
