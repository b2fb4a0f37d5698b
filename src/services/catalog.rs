use crate::models::{domain::id_string, Property};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading the property catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid catalog data in {path}: {message}")]
    InvalidShape { path: PathBuf, message: String },

    #[error("record {index} in {path} has no usable id")]
    MissingId { path: PathBuf, index: usize },
}

/// Immutable snapshot of every listing, built once at startup
///
/// Shared read-only across requests; nothing mutates it after `load`.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    properties: Vec<Property>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog from already-joined properties
    ///
    /// Later duplicates of an id are dropped.
    pub fn from_properties(properties: Vec<Property>) -> Self {
        let mut kept = Vec::with_capacity(properties.len());
        let mut index = HashMap::with_capacity(properties.len());

        for property in properties {
            if index.contains_key(&property.id) {
                tracing::warn!("Duplicate property id {} in catalog, keeping first", property.id);
                continue;
            }
            index.insert(property.id.clone(), kept.len());
            kept.push(property);
        }

        Self {
            properties: kept,
            index,
        }
    }

    /// Load and join the catalog sources
    ///
    /// `basics` holds one record per listing. `characteristics` records are
    /// merged key by key into each listing's `characteristics` object, where
    /// keys already present in the basics record win; `images` records are
    /// merged in as top-level fields the listing does not already have.
    /// Within the characteristics and images files the first record for an
    /// id wins, as in the basics file.
    pub fn load(
        basics: &Path,
        characteristics: Option<&Path>,
        images: Option<&Path>,
    ) -> Result<Self, CatalogError> {
        let mut records = read_records(basics)?;

        if let Some(path) = characteristics {
            let by_id = keyed_records(path)?;
            for record in records.iter_mut() {
                if let Some(extra) = by_id.get(&record.id) {
                    merge_characteristics(&mut record.fields, extra);
                }
            }
        }

        if let Some(path) = images {
            let by_id = keyed_records(path)?;
            for record in records.iter_mut() {
                if let Some(extra) = by_id.get(&record.id) {
                    for (key, value) in extra {
                        record.fields.entry(key.clone()).or_insert_with(|| value.clone());
                    }
                }
            }
        }

        let catalog = Self::from_properties(records);
        tracing::info!("Loaded {} properties from {}", catalog.len(), basics.display());
        Ok(catalog)
    }

    pub fn get(&self, id: &str) -> Option<&Property> {
        self.index.get(id).map(|&i| &self.properties[i])
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Catalog entries not named in `exclude_ids`, in catalog order
    pub fn candidates(&self, exclude_ids: &[String]) -> Vec<Property> {
        self.properties
            .iter()
            .filter(|p| !exclude_ids.contains(&p.id))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

fn read_array(path: &Path) -> Result<Vec<Value>, CatalogError> {
    let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let json: Value = serde_json::from_str(&text).map_err(|source| CatalogError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    match json {
        Value::Array(items) => Ok(items),
        _ => Err(CatalogError::InvalidShape {
            path: path.to_path_buf(),
            message: "expected a JSON array".to_string(),
        }),
    }
}

fn read_records(path: &Path) -> Result<Vec<Property>, CatalogError> {
    read_array(path)?
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let Value::Object(mut fields) = item else {
                return Err(CatalogError::InvalidShape {
                    path: path.to_path_buf(),
                    message: format!("record {} is not an object", index),
                });
            };
            let id = fields
                .remove("id")
                .as_ref()
                .and_then(id_string)
                .ok_or_else(|| CatalogError::MissingId {
                    path: path.to_path_buf(),
                    index,
                })?;
            Ok(Property::new(id, fields))
        })
        .collect()
}

fn keyed_records(path: &Path) -> Result<HashMap<String, Map<String, Value>>, CatalogError> {
    let mut by_id = HashMap::new();
    for record in read_records(path)? {
        if by_id.contains_key(&record.id) {
            tracing::warn!("Duplicate id {} in {}, keeping first", record.id, path.display());
            continue;
        }
        by_id.insert(record.id, record.fields);
    }
    Ok(by_id)
}

fn merge_characteristics(fields: &mut Map<String, Value>, extra: &Map<String, Value>) {
    if let Some(Value::Object(existing)) = fields.get_mut("characteristics") {
        for (key, value) in extra {
            existing.entry(key.clone()).or_insert_with(|| value.clone());
        }
        return;
    }

    if fields.contains_key("characteristics") {
        tracing::warn!("Replacing non-object characteristics with catalog entry");
    }
    fields.insert("characteristics".to_string(), Value::Object(extra.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn write_json(name: &str, value: Value) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "home-recommender-{}-{}.json",
            name,
            uuid::Uuid::new_v4()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(value.to_string().as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_joins_sources() {
        let basics = write_json(
            "basics",
            json!([
                {"id": 1, "title": "Bungalow", "price": 450000, "bedrooms": 2},
                {"id": "2", "title": "Loft", "price": 390000}
            ]),
        );
        let characteristics = write_json(
            "chars",
            json!([{"id": 1, "school_rating": 8, "amenities": ["Garden"]}]),
        );
        let images = write_json("images", json!([{"id": 2, "image_url": "/img/2.jpg"}]));

        let catalog = Catalog::load(&basics, Some(&characteristics), Some(&images)).unwrap();

        assert_eq!(catalog.len(), 2);
        let first = catalog.get("1").unwrap();
        assert_eq!(first.characteristics().unwrap().get("school_rating"), Some(&json!(8)));
        let second = catalog.get("2").unwrap();
        assert_eq!(second.fields.get("image_url"), Some(&json!("/img/2.jpg")));
        assert!(second.characteristics().is_none());
    }

    #[test]
    fn test_characteristics_merged_into_existing_object() {
        let basics = write_json(
            "basics",
            json!([{"id": 1, "characteristics": {"school_rating": 9}}]),
        );
        let characteristics = write_json(
            "chars",
            json!([{"id": 1, "school_rating": 4, "commute_time": 25}]),
        );

        let catalog = Catalog::load(&basics, Some(&characteristics), None).unwrap();

        let merged = catalog.get("1").unwrap().characteristics().unwrap();
        assert_eq!(merged.get("school_rating"), Some(&json!(9)));
        assert_eq!(merged.get("commute_time"), Some(&json!(25)));
    }

    #[test]
    fn test_first_duplicate_wins_in_every_source() {
        let basics = write_json("basics", json!([{"id": 1}]));
        let characteristics = write_json(
            "chars",
            json!([{"id": 1, "school_rating": 8}, {"id": 1, "school_rating": 2}]),
        );
        let images = write_json(
            "images",
            json!([{"id": 1, "image_url": "/first.jpg"}, {"id": 1, "image_url": "/second.jpg"}]),
        );

        let catalog = Catalog::load(&basics, Some(&characteristics), Some(&images)).unwrap();

        let listing = catalog.get("1").unwrap();
        assert_eq!(listing.characteristics().unwrap().get("school_rating"), Some(&json!(8)));
        assert_eq!(listing.fields.get("image_url"), Some(&json!("/first.jpg")));
    }

    #[test]
    fn test_missing_id_rejected() {
        let basics = write_json("noid", json!([{"price": 1}]));
        assert!(matches!(
            Catalog::load(&basics, None, None),
            Err(CatalogError::MissingId { index: 0, .. })
        ));
    }

    #[test]
    fn test_non_array_rejected() {
        let basics = write_json("object", json!({"id": 1}));
        assert!(matches!(
            Catalog::load(&basics, None, None),
            Err(CatalogError::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_duplicates_and_exclusions() {
        let catalog = Catalog::from_properties(vec![
            Property::new("a", Map::new()),
            Property::new("b", Map::new()),
            Property::new("a", Map::new()),
        ]);
        assert_eq!(catalog.len(), 2);

        let candidates = catalog.candidates(&["a".to_string()]);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, "b");
    }
}
