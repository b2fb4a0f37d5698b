use crate::core::{
    blend::{blend_scores, price_favorability_score},
    normalizer::PropertyFeatures,
    ranker::{rank_top, TOP_N},
    reasoning::build_reasoning,
    scoring::{calculate_rule_score, round2},
};
use crate::models::{
    MlMetadata, PredictionOutcome, Property, ScoredProperty, ScoringSummary, UserPreferences,
};

/// Result of the recommendation pipeline
#[derive(Debug, Clone)]
pub struct Recommendation {
    pub results: Vec<ScoredProperty>,
    pub total_properties: usize,
    pub properties_with_ml_scores: usize,
    pub ml_used: bool,
    pub ml_fallback_detected: bool,
    pub ml_fallback_message: Option<String>,
}

/// Main recommendation orchestrator
///
/// # Pipeline Stages
/// 1. Normalize each candidate into typed features
/// 2. Rule scoring, using the predicted price when one exists
/// 3. Price favorability from the predicted price and budget
/// 4. Blend, rank and truncate to the top results
/// 5. Explain each surviving result
#[derive(Debug, Clone)]
pub struct Recommender {
    limit: usize,
}

impl Recommender {
    pub fn new() -> Self {
        Self { limit: TOP_N }
    }

    /// Rank candidates against the user's preferences
    ///
    /// # Arguments
    /// * `preferences` - The user's preferences
    /// * `candidates` - Eligible properties from the catalog
    /// * `predictions` - What the price predictor produced for this batch
    ///
    /// # Returns
    /// Recommendation with at most three scored and explained properties
    pub fn recommend(
        &self,
        preferences: &UserPreferences,
        candidates: &[Property],
        predictions: &PredictionOutcome,
    ) -> Recommendation {
        let budget = preferences.effective_budget();
        let total_properties = candidates.len();

        let scored: Vec<(PropertyFeatures, f64, ScoredProperty)> = candidates
            .iter()
            .map(|property| {
                let features = PropertyFeatures::from_property(property);
                let predicted_price = predictions.price_for(&property.id);

                let rule = calculate_rule_score(&features, preferences, predicted_price);
                let ml_price_score = price_favorability_score(predicted_price, budget);
                let final_score = blend_scores(rule.total, ml_price_score);

                tracing::debug!(
                    "Scored property {}: rule={:.2}, ml_price={:?}, final={:.2}",
                    property.id,
                    rule.total,
                    ml_price_score,
                    final_score
                );

                let scored = ScoredProperty {
                    property: property.without_output_keys(),
                    reasoning: String::new(),
                    match_score: round2(final_score),
                    listing_price: features.price,
                    model_predicted_price: predicted_price,
                    is_model_applied: ml_price_score.is_some(),
                    scores: rule.breakdown(),
                    scoring: ScoringSummary {
                        rule_score: round2(rule.total),
                        ml_price_score: ml_price_score.map(round2),
                        final_score: round2(final_score),
                    },
                    ml_metadata: MlMetadata {
                        ml_used_for_property: ml_price_score.is_some(),
                        predicted_price,
                    },
                };
                (features, final_score, scored)
            })
            .collect();

        let properties_with_ml_scores = scored
            .iter()
            .filter(|(_, _, s)| s.scoring.ml_price_score.is_some())
            .count();

        let ranked = rank_top(scored, self.limit, |(_, final_score, _)| Some(*final_score));

        let results = ranked
            .into_iter()
            .map(|(features, _, mut scored)| {
                scored.reasoning =
                    build_reasoning(&features, preferences, scored.model_predicted_price);
                scored
            })
            .collect();

        Recommendation {
            results,
            total_properties,
            properties_with_ml_scores,
            ml_used: predictions.ml_used(),
            ml_fallback_detected: !predictions.ml_used(),
            ml_fallback_message: predictions.fallback_message(),
        }
    }
}

impl Default for Recommender {
    fn default() -> Self {
        Self::new()
    }
}
