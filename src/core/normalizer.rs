use serde::Serialize;
use serde_json::Value;

use crate::models::Property;

/// Defaults substituted when building a predictor request
pub const DEFAULT_SCHOOL_RATING: f64 = 7.0;
pub const DEFAULT_COMMUTE_TIME: f64 = 30.0;
pub const DEFAULT_PROPERTY_AGE: f64 = 10.0;

/// Where a field value may be found on a property record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    TopLevel(&'static str),
    Characteristics(&'static str),
}

/// Fields the pipeline reads from heterogeneous property records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyField {
    Price,
    Bedrooms,
    Bathrooms,
    Size,
    SchoolRating,
    CommuteTime,
    PropertyAge,
    Amenities,
}

impl PropertyField {
    /// Lookup chain in precedence order: explicit top-level name, alternate
    /// spellings, then the nested characteristics bag
    pub fn sources(self) -> &'static [FieldSource] {
        use FieldSource::{Characteristics, TopLevel};

        match self {
            PropertyField::Price => &[
                TopLevel("price"),
                TopLevel("listing_price"),
                TopLevel("listingPrice"),
            ],
            PropertyField::Bedrooms => &[
                TopLevel("bedrooms"),
                TopLevel("beds"),
                Characteristics("bedrooms"),
            ],
            PropertyField::Bathrooms => &[
                TopLevel("bathrooms"),
                TopLevel("baths"),
                Characteristics("bathrooms"),
            ],
            PropertyField::Size => &[
                TopLevel("size_sqft"),
                TopLevel("size"),
                Characteristics("size_sqft"),
            ],
            PropertyField::SchoolRating => &[
                TopLevel("school_rating"),
                TopLevel("schoolRating"),
                Characteristics("school_rating"),
            ],
            PropertyField::CommuteTime => &[
                TopLevel("commute_time"),
                TopLevel("commuteTime"),
                Characteristics("commute_time"),
            ],
            PropertyField::PropertyAge => &[
                TopLevel("property_age"),
                TopLevel("propertyAge"),
                Characteristics("property_age"),
            ],
            PropertyField::Amenities => &[
                TopLevel("amenities"),
                Characteristics("amenities"),
            ],
        }
    }
}

fn raw_value<'a>(property: &'a Property, source: FieldSource) -> Option<&'a Value> {
    let value = match source {
        FieldSource::TopLevel(key) => property.fields.get(key),
        FieldSource::Characteristics(key) => property.characteristics()?.get(key),
    };
    value.filter(|value| !value.is_null())
}

/// Coerce a JSON value to a finite number
///
/// Numbers pass through, numeric strings are parsed. Anything else,
/// including NaN and infinities, yields `None`.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        _ => return None,
    };

    number.is_finite().then_some(number)
}

/// Coerce a JSON value to a cleaned amenity list
///
/// Arrays keep their string entries; a single string is split on commas.
/// Entries are trimmed and blanks dropped. Original casing is preserved.
pub fn coerce_amenities(value: &Value) -> Option<Vec<String>> {
    let entries: Vec<String> = match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect(),
        _ => return None,
    };

    (!entries.is_empty()).then_some(entries)
}

/// First non-null value along a field's lookup chain
///
/// Later sources are only consulted when earlier ones are absent; a present
/// but unusable value still wins and normalizes to nothing.
fn first_present(property: &Property, field: PropertyField) -> Option<&Value> {
    field
        .sources()
        .iter()
        .find_map(|source| raw_value(property, *source))
}

/// Resolve a numeric field
pub fn resolve_number(property: &Property, field: PropertyField) -> Option<f64> {
    first_present(property, field).and_then(coerce_number)
}

/// Resolve the amenity list; an explicit empty list stays empty
pub fn resolve_amenities(property: &Property) -> Vec<String> {
    first_present(property, PropertyField::Amenities)
        .and_then(coerce_amenities)
        .unwrap_or_default()
}

/// Location tokens a preferred-area entry can match exactly
///
/// Includes the `location` string, the city, and "City, State".
pub fn location_tokens(property: &Property) -> Vec<String> {
    let text = |key: &str| {
        property
            .fields
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };

    let mut tokens = Vec::new();
    if let Some(location) = text("location") {
        tokens.push(location.to_string());
    }
    if let Some(city) = text("city") {
        tokens.push(city.to_string());
        if let Some(state) = text("state") {
            tokens.push(format!("{}, {}", city, state));
        }
    }
    tokens
}

/// Typed view of a property used by the scorer and reason builder
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyFeatures {
    pub id: String,
    pub price: Option<f64>,
    pub bedrooms: Option<f64>,
    pub bathrooms: Option<f64>,
    pub size_sqft: Option<f64>,
    pub school_rating: Option<f64>,
    pub commute_time: Option<f64>,
    pub property_age: Option<f64>,
    pub amenities: Vec<String>,
    pub locations: Vec<String>,
}

impl PropertyFeatures {
    pub fn from_property(property: &Property) -> Self {
        Self {
            id: property.id.clone(),
            price: resolve_number(property, PropertyField::Price),
            bedrooms: resolve_number(property, PropertyField::Bedrooms),
            bathrooms: resolve_number(property, PropertyField::Bathrooms),
            size_sqft: resolve_number(property, PropertyField::Size),
            school_rating: resolve_number(property, PropertyField::SchoolRating),
            commute_time: resolve_number(property, PropertyField::CommuteTime),
            property_age: resolve_number(property, PropertyField::PropertyAge),
            amenities: resolve_amenities(property),
            locations: location_tokens(property),
        }
    }
}

/// One row of the batch sent to the price predictor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictorFeatures {
    pub id: String,
    pub price: Option<f64>,
    pub bedrooms: Option<f64>,
    pub bathrooms: Option<f64>,
    pub size_sqft: Option<f64>,
    pub school_rating: f64,
    pub commute_time: f64,
    pub property_age: f64,
}

impl From<&PropertyFeatures> for PredictorFeatures {
    fn from(features: &PropertyFeatures) -> Self {
        Self {
            id: features.id.clone(),
            price: features.price,
            bedrooms: features.bedrooms,
            bathrooms: features.bathrooms,
            size_sqft: features.size_sqft,
            school_rating: features.school_rating.unwrap_or(DEFAULT_SCHOOL_RATING),
            commute_time: features.commute_time.unwrap_or(DEFAULT_COMMUTE_TIME),
            property_age: features.property_age.unwrap_or(DEFAULT_PROPERTY_AGE),
        }
    }
}

/// Build the predictor request rows for a candidate set
pub fn predictor_batch(candidates: &[Property]) -> Vec<PredictorFeatures> {
    candidates
        .iter()
        .map(|property| PredictorFeatures::from(&PropertyFeatures::from_property(property)))
        .collect()
}
