/// Weight of the rule score in the blended score
pub const RULE_WEIGHT: f64 = 0.7;
/// Weight of the price favorability score in the blended score
pub const PRICE_WEIGHT: f64 = 0.3;

/// Over-budget ratio at which favorability bottoms out
const MAX_OVER_RATIO: f64 = 1.5;

/// Map a predicted price against a budget onto 0-100
///
/// At or under budget the score runs 60..=100 as the price falls toward
/// zero; over budget it runs 60..=0 as the overshoot grows to 150%.
/// Both branches give 60 at exactly the budget.
pub fn price_favorability_score(predicted_price: Option<f64>, budget: Option<f64>) -> Option<f64> {
    let price = predicted_price.filter(|p| p.is_finite() && *p > 0.0)?;
    let budget = budget.filter(|b| b.is_finite() && *b > 0.0)?;

    let ratio = price / budget;
    let score = if ratio <= 1.0 {
        60.0 + 40.0 * (1.0 - ratio)
    } else {
        let over = (ratio - 1.0).min(MAX_OVER_RATIO);
        (60.0 - 40.0 * over).max(0.0)
    };

    Some(score)
}

/// Blend a rule score with an optional favorability score
///
/// Without a favorability score the rule score is returned untouched.
#[inline]
pub fn blend_scores(rule_score: f64, favorability: Option<f64>) -> f64 {
    match favorability {
        Some(price_score) => RULE_WEIGHT * rule_score + PRICE_WEIGHT * price_score,
        None => rule_score,
    }
}
