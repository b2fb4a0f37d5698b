use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::core::normalizer::coerce_number;

/// A listing from the property catalog
///
/// Only the identifier is typed. Every other field is kept verbatim so the
/// record can be echoed back to the caller; the normalizer resolves typed
/// values out of `fields` on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    #[serde(deserialize_with = "id_from_value")]
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Property {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Nested characteristics bag, if the record carries one
    pub fn characteristics(&self) -> Option<&Map<String, Value>> {
        self.fields.get("characteristics").and_then(Value::as_object)
    }

    /// Copy of the record without keys the scored output computes itself
    pub fn without_output_keys(&self) -> Self {
        let mut fields = self.fields.clone();
        for key in RESERVED_OUTPUT_KEYS {
            fields.remove(*key);
        }
        Self {
            id: self.id.clone(),
            fields,
        }
    }
}

/// Keys written by `ScoredProperty` next to the flattened listing fields
pub const RESERVED_OUTPUT_KEYS: &[&str] = &[
    "reasoning",
    "matchScore",
    "listingPrice",
    "modelPredictedPrice",
    "isModelApplied",
    "scores",
    "scoring",
    "ml_metadata",
];

/// Convert a JSON id (string or number) to its string form
pub fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn id_from_value<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    id_string(&value).ok_or_else(|| serde::de::Error::custom("property id must be a string or number"))
}

/// User recommendation preferences
///
/// Numeric fields accept numbers or numeric strings. Null, zero or negative
/// values mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    #[serde(default, deserialize_with = "lenient_number")]
    pub budget: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub min_bedrooms: Option<f64>,
    #[validate(length(max = 50))]
    #[serde(default, deserialize_with = "nullable_list")]
    pub preferred_areas: Vec<String>,
    /// Accepted for compatibility; not used by scoring
    #[serde(default, deserialize_with = "lenient_number")]
    pub max_commute_time: Option<f64>,
}

impl UserPreferences {
    /// Budget if it constrains anything
    pub fn effective_budget(&self) -> Option<f64> {
        positive(self.budget)
    }

    /// Minimum bedroom count if it constrains anything
    pub fn effective_min_bedrooms(&self) -> Option<f64> {
        positive(self.min_bedrooms)
    }
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_number))
}

fn nullable_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Vec<String>>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

/// Per-factor scores of the rule scorer, each in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub price_match_score: f64,
    pub bedroom_score: f64,
    pub school_rating_score: f64,
    pub commute_score: f64,
    pub property_age_score: f64,
    pub amenities_score: f64,
    /// Rule score rounded to two decimals
    pub total_score: f64,
}

/// Rule scorer weights
///
/// The combination must reproduce these coefficients exactly; they are not
/// configurable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleWeights {
    pub price: f64,
    pub bedrooms: f64,
    pub school: f64,
    pub commute: f64,
    pub age: f64,
    pub amenities: f64,
}

impl RuleWeights {
    pub const FIXED: RuleWeights = RuleWeights {
        price: 0.30,
        bedrooms: 0.20,
        school: 0.15,
        commute: 0.15,
        age: 0.10,
        amenities: 0.10,
    };
}

impl Default for RuleWeights {
    fn default() -> Self {
        Self::FIXED
    }
}

/// Score components exposed under `scoring`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringSummary {
    pub rule_score: f64,
    pub ml_price_score: Option<f64>,
    pub final_score: f64,
}

/// Per-property prediction metadata
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MlMetadata {
    pub ml_used_for_property: bool,
    pub predicted_price: Option<f64>,
}

/// Scored and explained recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredProperty {
    #[serde(flatten)]
    pub property: Property,
    pub reasoning: String,
    #[serde(rename = "matchScore")]
    pub match_score: f64,
    #[serde(rename = "listingPrice")]
    pub listing_price: Option<f64>,
    #[serde(rename = "modelPredictedPrice")]
    pub model_predicted_price: Option<f64>,
    #[serde(rename = "isModelApplied")]
    pub is_model_applied: bool,
    pub scores: ScoreBreakdown,
    pub scoring: ScoringSummary,
    pub ml_metadata: MlMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_property_numeric_id() {
        let property: Property =
            serde_json::from_value(json!({"id": 42, "price": 500000})).unwrap();
        assert_eq!(property.id, "42");
        assert_eq!(property.fields.get("price"), Some(&json!(500000)));
    }

    #[test]
    fn test_without_output_keys() {
        let property: Property = serde_json::from_value(json!({
            "id": "p1",
            "price": 500000,
            "matchScore": 99,
            "scores": {"totalScore": 1},
            "ml_metadata": null
        }))
        .unwrap();

        let stripped = property.without_output_keys();
        assert_eq!(stripped.id, "p1");
        assert_eq!(stripped.fields.get("price"), Some(&json!(500000)));
        for key in RESERVED_OUTPUT_KEYS {
            assert!(!stripped.fields.contains_key(*key), "{} kept", key);
        }
    }

    #[test]
    fn test_property_missing_id_rejected() {
        let result: Result<Property, _> = serde_json::from_value(json!({"price": 1}));
        assert!(result.is_err());
    }

    #[test]
    fn test_preferences_lenient_numbers() {
        let prefs: UserPreferences = serde_json::from_value(json!({
            "budget": "600000",
            "minBedrooms": null,
            "preferredAreas": null,
        }))
        .unwrap();

        assert_eq!(prefs.budget, Some(600000.0));
        assert_eq!(prefs.min_bedrooms, None);
        assert!(prefs.preferred_areas.is_empty());
    }

    #[test]
    fn test_non_positive_means_no_constraint() {
        let prefs = UserPreferences {
            budget: Some(-5.0),
            min_bedrooms: Some(0.0),
            ..Default::default()
        };

        assert_eq!(prefs.effective_budget(), None);
        assert_eq!(prefs.effective_min_bedrooms(), None);
    }

    #[test]
    fn test_fixed_weights_sum_to_one() {
        let w = RuleWeights::FIXED;
        let sum = w.price + w.bedrooms + w.school + w.commute + w.age + w.amenities;
        assert!((sum - 1.0).abs() < 1e-12);
    }
}
