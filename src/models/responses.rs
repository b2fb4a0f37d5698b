use serde::{Deserialize, Serialize};
use crate::models::domain::{Property, ScoredProperty};

/// Response for the recommendations endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendResponse {
    #[serde(rename = "requestId")]
    pub request_id: String,
    pub recommendations: Vec<ScoredProperty>,
    pub ml_used: bool,
    pub ml_fallback_detected: bool,
    pub ml_fallback_message: Option<String>,
    pub diagnostics: Diagnostics,
    #[serde(rename = "generatedAt")]
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

/// Counts describing how much of the candidate set was model-assisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub total_properties: usize,
    pub properties_with_ml_scores: usize,
}

/// Catalog listing response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyListResponse {
    pub properties: Vec<Property>,
    pub total: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub catalog_size: usize,
    pub predictor: String,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
