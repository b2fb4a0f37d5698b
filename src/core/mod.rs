// Core algorithm exports
pub mod blend;
pub mod normalizer;
pub mod ranker;
pub mod reasoning;
pub mod recommender;
pub mod scoring;

pub use blend::{blend_scores, price_favorability_score};
pub use normalizer::{predictor_batch, PredictorFeatures, PropertyFeatures, PropertyField};
pub use ranker::{rank_top, TOP_N};
pub use reasoning::{build_reasoning, format_usd};
pub use recommender::{Recommendation, Recommender};
pub use scoring::{calculate_rule_score, compute_total_score, RuleScore, SubScores};
