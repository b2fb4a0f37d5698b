// Model exports
pub mod domain;
pub mod prediction;
pub mod requests;
pub mod responses;

pub use domain::{Property, UserPreferences, ScoreBreakdown, RuleWeights, ScoredProperty, ScoringSummary, MlMetadata};
pub use prediction::{PredictionOutcome, PredictionSet};
pub use requests::RecommendRequest;
pub use responses::{RecommendResponse, Diagnostics, PropertyListResponse, HealthResponse, ErrorResponse};
