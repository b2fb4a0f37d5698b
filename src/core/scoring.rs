use crate::core::normalizer::PropertyFeatures;
use crate::models::{RuleWeights, ScoreBreakdown, UserPreferences};

/// Neutral score when there is not enough information to judge a factor
const NEUTRAL: f64 = 50.0;

/// Sub-scores of the rule scorer before rounding
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubScores {
    pub price_match: f64,
    pub bedrooms: f64,
    pub school_rating: f64,
    pub commute: f64,
    pub property_age: f64,
    pub amenities: f64,
}

/// Rule score for one property
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleScore {
    pub sub_scores: SubScores,
    /// Unrounded weighted total
    pub total: f64,
}

impl RuleScore {
    pub fn breakdown(&self) -> ScoreBreakdown {
        let s = &self.sub_scores;
        ScoreBreakdown {
            price_match_score: s.price_match,
            bedroom_score: s.bedrooms,
            school_rating_score: s.school_rating,
            commute_score: s.commute,
            property_age_score: s.property_age,
            amenities_score: s.amenities,
            total_score: round2(self.total),
        }
    }
}

/// Calculate the rule score (0-100) for a property
///
/// Scoring formula:
/// score = (
///     price_match * 0.30 +      # predicted price against budget
///     bedrooms * 0.20 +         # meets the minimum bedroom count
///     school_rating * 0.15 +    # 0-10 rating scaled to 0-100
///     commute * 0.15 +          # step function on minutes
///     property_age * 0.10 +     # step function on years
///     amenities * 0.10          # pool / garage / garden-or-backyard
/// )
pub fn calculate_rule_score(
    features: &PropertyFeatures,
    preferences: &UserPreferences,
    predicted_price: Option<f64>,
) -> RuleScore {
    let sub_scores = SubScores {
        price_match: price_match_score(predicted_price, preferences.effective_budget()),
        bedrooms: bedroom_score(features.bedrooms, preferences.effective_min_bedrooms()),
        school_rating: school_rating_score(features.school_rating),
        commute: commute_score(features.commute_time),
        property_age: property_age_score(features.property_age),
        amenities: amenities_score(&features.amenities),
    };

    RuleScore {
        sub_scores,
        total: compute_total_score(&sub_scores, &RuleWeights::FIXED),
    }
}

/// Weighted linear combination of the six sub-scores
#[inline]
pub fn compute_total_score(scores: &SubScores, weights: &RuleWeights) -> f64 {
    scores.price_match * weights.price
        + scores.bedrooms * weights.bedrooms
        + scores.school_rating * weights.school
        + scores.commute * weights.commute
        + scores.property_age * weights.age
        + scores.amenities * weights.amenities
}

/// Price-match score
/// Full marks at or under budget, linear decay to 0 at twice the budget
#[inline]
pub fn price_match_score(predicted_price: Option<f64>, budget: Option<f64>) -> f64 {
    let (Some(price), Some(budget)) = (predicted_price, budget.filter(|b| *b > 0.0)) else {
        return NEUTRAL;
    };

    if price <= budget {
        return 100.0;
    }

    let penalty = 100.0 * (price - budget) / budget;
    (100.0 - penalty).max(0.0)
}

/// Bedroom score
/// An unknown bedroom count cannot satisfy a minimum
#[inline]
pub fn bedroom_score(bedrooms: Option<f64>, min_bedrooms: Option<f64>) -> f64 {
    let Some(min) = min_bedrooms.filter(|m| *m > 0.0) else {
        return 100.0;
    };
    let Some(actual) = bedrooms else {
        return 0.0;
    };

    if actual >= min {
        100.0
    } else {
        (actual / min * 100.0).clamp(0.0, 100.0)
    }
}

/// School rating score, rating on a 0-10 scale
#[inline]
pub fn school_rating_score(rating: Option<f64>) -> f64 {
    match rating {
        Some(rating) => (rating / 10.0 * 100.0).clamp(0.0, 100.0),
        None => NEUTRAL,
    }
}

/// Commute score (minutes)
#[inline]
pub fn commute_score(minutes: Option<f64>) -> f64 {
    match minutes {
        None => NEUTRAL,
        Some(m) if m <= 15.0 => 100.0,
        Some(m) if m <= 30.0 => 80.0,
        Some(m) if m <= 45.0 => 50.0,
        Some(_) => 20.0,
    }
}

/// Property age score (years)
#[inline]
pub fn property_age_score(years: Option<f64>) -> f64 {
    match years {
        None => 60.0,
        Some(y) if y <= 5.0 => 100.0,
        Some(y) if y <= 15.0 => 80.0,
        Some(y) if y <= 30.0 => 60.0,
        Some(_) => 40.0,
    }
}

/// Amenity signal families recognised by the scorer
const AMENITY_SIGNALS: [&[&str]; 3] = [&["pool"], &["garage"], &["garden", "backyard"]];

/// Amenities score
/// Share of the signal families present among the listed amenities
#[inline]
pub fn amenities_score(amenities: &[String]) -> f64 {
    if amenities.is_empty() {
        return 0.0;
    }

    let lowered: Vec<String> = amenities.iter().map(|a| a.to_lowercase()).collect();
    let matched = AMENITY_SIGNALS
        .iter()
        .filter(|keywords| {
            lowered
                .iter()
                .any(|amenity| keywords.iter().any(|k| amenity.contains(k)))
        })
        .count();

    matched as f64 / AMENITY_SIGNALS.len() as f64 * 100.0
}

/// Round to two decimal places
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amenities(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_price_match_score() {
        assert_eq!(price_match_score(None, Some(500_000.0)), 50.0);
        assert_eq!(price_match_score(Some(500_000.0), None), 50.0);
        assert_eq!(price_match_score(Some(500_000.0), Some(500_000.0)), 100.0);
        assert_eq!(price_match_score(Some(400_000.0), Some(500_000.0)), 100.0);
        // 10% over budget
        assert!((price_match_score(Some(550_000.0), Some(500_000.0)) - 90.0).abs() < 1e-9);
        // Double the budget and beyond floors at zero
        assert_eq!(price_match_score(Some(1_000_000.0), Some(500_000.0)), 0.0);
        assert_eq!(price_match_score(Some(2_000_000.0), Some(500_000.0)), 0.0);
    }

    #[test]
    fn test_bedroom_score() {
        assert_eq!(bedroom_score(Some(1.0), None), 100.0);
        assert_eq!(bedroom_score(None, None), 100.0);
        assert_eq!(bedroom_score(None, Some(2.0)), 0.0);
        assert_eq!(bedroom_score(Some(3.0), Some(2.0)), 100.0);
        assert_eq!(bedroom_score(Some(1.0), Some(2.0)), 50.0);
        assert_eq!(bedroom_score(Some(-1.0), Some(2.0)), 0.0);
    }

    #[test]
    fn test_school_rating_score() {
        assert_eq!(school_rating_score(None), 50.0);
        assert_eq!(school_rating_score(Some(8.0)), 80.0);
        assert_eq!(school_rating_score(Some(12.0)), 100.0);
        assert_eq!(school_rating_score(Some(-3.0)), 0.0);
    }

    #[test]
    fn test_commute_score_steps() {
        assert_eq!(commute_score(None), 50.0);
        assert_eq!(commute_score(Some(15.0)), 100.0);
        assert_eq!(commute_score(Some(15.5)), 80.0);
        assert_eq!(commute_score(Some(30.0)), 80.0);
        assert_eq!(commute_score(Some(45.0)), 50.0);
        assert_eq!(commute_score(Some(46.0)), 20.0);
    }

    #[test]
    fn test_property_age_score_steps() {
        assert_eq!(property_age_score(None), 60.0);
        assert_eq!(property_age_score(Some(5.0)), 100.0);
        assert_eq!(property_age_score(Some(15.0)), 80.0);
        assert_eq!(property_age_score(Some(30.0)), 60.0);
        assert_eq!(property_age_score(Some(31.0)), 40.0);
    }

    #[test]
    fn test_amenities_score() {
        assert_eq!(amenities_score(&[]), 0.0);
        assert_eq!(amenities_score(&amenities(&["Gym", "Sauna"])), 0.0);
        assert!((amenities_score(&amenities(&["Swimming Pool"])) - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(
            amenities_score(&amenities(&["POOL", "Attached Garage", "Large Backyard"])),
            100.0
        );
        // Garden and backyard are one family
        assert!(
            (amenities_score(&amenities(&["Garden", "Backyard"])) - 100.0 / 3.0).abs() < 1e-9
        );
    }

    #[test]
    fn test_total_uses_fixed_weights() {
        let scores = SubScores {
            price_match: 100.0,
            bedrooms: 0.0,
            school_rating: 0.0,
            commute: 0.0,
            property_age: 0.0,
            amenities: 0.0,
        };
        assert!((compute_total_score(&scores, &RuleWeights::FIXED) - 30.0).abs() < 1e-9);

        let scores = SubScores {
            price_match: 50.0,
            bedrooms: 100.0,
            school_rating: 80.0,
            commute: 80.0,
            property_age: 60.0,
            amenities: 0.0,
        };
        // 15 + 20 + 12 + 12 + 6 + 0
        assert!((compute_total_score(&scores, &RuleWeights::FIXED) - 65.0).abs() < 1e-9);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(63.33333), 63.33);
        assert_eq!(round2(79.999), 80.0);
    }
}
