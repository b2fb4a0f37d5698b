// Integration tests for Home Recommender

use home_recommender::core::Recommender;
use home_recommender::models::{PredictionOutcome, PredictionSet, Property, UserPreferences};
use serde_json::json;

fn listing(id: &str, price: u64, bedrooms: u32, city: &str) -> Property {
    serde_json::from_value(json!({
        "id": id,
        "title": format!("Listing {}", id),
        "price": price,
        "bedrooms": bedrooms,
        "bathrooms": 2,
        "size_sqft": 1600,
        "city": city,
        "state": "TX",
        "characteristics": {
            "school_rating": 8,
            "commute_time": 25,
            "property_age": 12,
        },
        "amenities": ["Pool", "Garage"],
    }))
    .unwrap()
}

fn preferences() -> UserPreferences {
    UserPreferences {
        budget: Some(600_000.0),
        min_bedrooms: Some(2.0),
        preferred_areas: vec!["Austin, TX".to_string()],
        max_commute_time: Some(30.0),
    }
}

#[test]
fn test_scenario_prediction_blended_into_final_score() {
    let candidates = vec![listing("A", 575_000, 3, "Austin")];
    let set: PredictionSet = vec![("A".to_string(), 550_000.0)].into_iter().collect();

    let result = Recommender::new().recommend(
        &preferences(),
        &candidates,
        &PredictionOutcome::from_set(set),
    );

    let a = &result.results[0];
    assert_eq!(a.scores.price_match_score, 100.0);
    assert_eq!(a.scores.bedroom_score, 100.0);

    let favorability = 60.0 + 40.0 * (1.0 - 550_000.0 / 600_000.0);
    assert_eq!(a.scoring.ml_price_score, Some(63.33));

    // 30 + 20 + 12 + 12 + 8 + 6.67
    let rule = 30.0 + 20.0 + 12.0 + 12.0 + 8.0 + 10.0 * 2.0 / 3.0;
    let expected = 0.7 * rule + 0.3 * favorability;
    assert!((a.match_score - expected).abs() < 0.006, "{} vs {}", a.match_score, expected);

    assert!(a.is_model_applied);
    assert!(a.ml_metadata.ml_used_for_property);
    assert_eq!(a.model_predicted_price, Some(550_000.0));
    assert!(a.reasoning.contains("$550,000"));
    assert!(result.ml_used);
    assert!(!result.ml_fallback_detected);
    assert_eq!(result.ml_fallback_message, None);
}

#[test]
fn test_scenario_predictor_failure_falls_back() {
    let candidates = vec![
        listing("A", 575_000, 3, "Austin"),
        listing("B", 650_000, 4, "Dallas"),
        listing("C", 420_000, 1, "Austin"),
    ];
    let outcome = PredictionOutcome::Failed {
        reason: "request timed out after 3000 ms".to_string(),
    };

    let result = Recommender::new().recommend(&preferences(), &candidates, &outcome);

    assert!(result.ml_fallback_detected);
    assert!(!result.ml_used);
    assert!(result.ml_fallback_message.unwrap().contains("timed out"));
    assert_eq!(result.properties_with_ml_scores, 0);

    for r in &result.results {
        assert!(!r.ml_metadata.ml_used_for_property);
        assert_eq!(r.model_predicted_price, None);
        assert_eq!(r.scoring.final_score, r.scoring.rule_score);
        assert!(r.reasoning.contains("prediction unavailable"));
    }

    for pair in result.results.windows(2) {
        assert!(pair[0].match_score >= pair[1].match_score);
    }
}

#[test]
fn test_scenario_missing_amenities() {
    let candidates = vec![serde_json::from_value::<Property>(json!({
        "id": "bare",
        "price": 300000,
        "bedrooms": 2,
        "characteristics": {}
    }))
    .unwrap()];

    let result = Recommender::new().recommend(&preferences(), &candidates, &PredictionOutcome::Empty);

    let bare = &result.results[0];
    assert_eq!(bare.scores.amenities_score, 0.0);
    assert!(!bare.reasoning.contains("Amenities"));
    assert!(result.ml_fallback_message.unwrap().contains("no usable predictions"));
}

#[test]
fn test_scenario_zero_min_bedrooms_is_no_constraint() {
    let candidates = vec![listing("studio", 300_000, 0, "Austin"), listing("big", 300_000, 5, "Austin")];
    let prefs = UserPreferences {
        min_bedrooms: Some(0.0),
        ..preferences()
    };

    let result = Recommender::new().recommend(&prefs, &candidates, &PredictionOutcome::Empty);

    for r in &result.results {
        assert_eq!(r.scores.bedroom_score, 100.0);
        assert!(!r.reasoning.contains("bedroom"));
    }
}

#[test]
fn test_top_three_and_stable_ties() {
    let candidates: Vec<Property> = (0..6)
        .map(|i| listing(&format!("p{}", i), 500_000, 3, "Austin"))
        .collect();

    let result = Recommender::new().recommend(&preferences(), &candidates, &PredictionOutcome::Empty);

    assert_eq!(result.total_properties, 6);
    let ids: Vec<_> = result.results.iter().map(|r| r.property.id.as_str()).collect();
    assert_eq!(ids, vec!["p0", "p1", "p2"]);
}

#[test]
fn test_cheaper_prediction_ranks_higher() {
    let candidates = vec![listing("pricey", 500_000, 3, "Austin"), listing("bargain", 500_000, 3, "Austin")];
    let set: PredictionSet = vec![
        ("pricey".to_string(), 900_000.0),
        ("bargain".to_string(), 400_000.0),
    ]
    .into_iter()
    .collect();

    let result = Recommender::new().recommend(
        &preferences(),
        &candidates,
        &PredictionOutcome::from_set(set),
    );

    assert_eq!(result.results[0].property.id, "bargain");
    assert_eq!(result.properties_with_ml_scores, 2);
}

#[test]
fn test_output_preserves_original_fields() {
    let candidates = vec![listing("A", 575_000, 3, "Austin")];
    let result = Recommender::new().recommend(&preferences(), &candidates, &PredictionOutcome::Empty);

    let json = serde_json::to_value(&result.results[0]).unwrap();
    assert_eq!(json["id"], "A");
    assert_eq!(json["title"], "Listing A");
    assert_eq!(json["listingPrice"], 575000.0);
    assert!(json["modelPredictedPrice"].is_null());
    assert_eq!(json["isModelApplied"], false);
    assert!(json["scores"]["totalScore"].is_number());
    assert!(json["scoring"]["ml_price_score"].is_null());
    assert_eq!(json["ml_metadata"]["ml_used_for_property"], false);
}
