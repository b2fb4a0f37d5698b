//! Home Recommender - real-estate recommendation service
//!
//! This library ranks property listings against a user's preferences. A
//! weighted rule score is blended with an optional externally predicted
//! price, and every result carries a plain-language explanation.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Recommender, Recommendation, calculate_rule_score, price_favorability_score, blend_scores};
pub use crate::models::{Property, UserPreferences, ScoredProperty, ScoreBreakdown, PredictionOutcome, PredictionSet, RecommendRequest, RecommendResponse};
