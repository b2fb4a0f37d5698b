use crate::core::normalizer::PropertyFeatures;
use crate::models::UserPreferences;

/// Format a dollar amount as a whole-dollar US string, e.g. `$1,250,000`
pub fn format_usd(amount: f64) -> String {
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}${}", sign, grouped)
}

fn format_count(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

fn plural(count: f64, word: &str) -> String {
    if count == 1.0 {
        format!("{} {}", format_count(count), word)
    } else {
        format!("{} {}s", format_count(count), word)
    }
}

fn price_remark(
    features: &PropertyFeatures,
    budget: Option<f64>,
    predicted_price: Option<f64>,
) -> Option<String> {
    if let Some(predicted) = predicted_price {
        let remark = match budget {
            Some(budget) if predicted <= budget => format!(
                "Our price model values this home at {}, which fits your budget of {}.",
                format_usd(predicted),
                format_usd(budget)
            ),
            Some(budget) => format!(
                "Our price model values this home at {}, which is above your budget of {}.",
                format_usd(predicted),
                format_usd(budget)
            ),
            None => format!(
                "Our price model values this home at {}.",
                format_usd(predicted)
            ),
        };
        return Some(remark);
    }

    let (price, budget) = (features.price?, budget?);
    let fit = if price <= budget { "within" } else { "above" };
    Some(format!(
        "Listed at {}, {} your budget of {} (model price prediction unavailable).",
        format_usd(price),
        fit,
        format_usd(budget)
    ))
}

fn bedroom_remark(features: &PropertyFeatures, min_bedrooms: Option<f64>) -> Option<String> {
    let min = min_bedrooms?;

    let remark = match features.bedrooms {
        None => format!(
            "The bedroom count is not listed, and you asked for at least {}.",
            format_count(min)
        ),
        Some(actual) if actual > min => format!(
            "It has {}, more than your minimum of {}.",
            plural(actual, "bedroom"),
            format_count(min)
        ),
        Some(actual) if actual == min => format!(
            "It has exactly the {} you asked for.",
            plural(actual, "bedroom")
        ),
        Some(actual) => format!(
            "It has {}, fewer than your minimum of {}.",
            plural(actual, "bedroom"),
            format_count(min)
        ),
    };
    Some(remark)
}

fn area_remark(features: &PropertyFeatures, preferred_areas: &[String]) -> Option<String> {
    if preferred_areas.is_empty() {
        return None;
    }

    let matched = features
        .locations
        .iter()
        .find(|token| preferred_areas.iter().any(|area| area == *token));

    let remark = match matched {
        Some(area) => format!("It is located in {}, one of your preferred areas.", area),
        None => match features.locations.first() {
            Some(location) => format!("It is located in {}, outside your preferred areas.", location),
            None => "Its location is not listed, so it may be outside your preferred areas."
                .to_string(),
        },
    };
    Some(remark)
}

fn amenities_remark(features: &PropertyFeatures) -> Option<String> {
    if features.amenities.is_empty() {
        return None;
    }
    Some(format!("Amenities include {}.", features.amenities.join(", ")))
}

/// Build the explanation paragraph for a property
///
/// Remarks whose underlying data is missing are omitted.
pub fn build_reasoning(
    features: &PropertyFeatures,
    preferences: &UserPreferences,
    predicted_price: Option<f64>,
) -> String {
    [
        price_remark(features, preferences.effective_budget(), predicted_price),
        bedroom_remark(features, preferences.effective_min_bedrooms()),
        area_remark(features, &preferences.preferred_areas),
        amenities_remark(features),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
}
