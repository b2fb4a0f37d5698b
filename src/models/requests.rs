use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::UserPreferences;

/// Request to rank the catalog against a user's preferences
///
/// Preference fields sit at the top level of the body next to `excludeIds`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RecommendRequest {
    #[serde(flatten)]
    #[validate(nested)]
    pub preferences: UserPreferences,
    #[validate(length(max = 500))]
    #[serde(default, alias = "exclude_ids", rename = "excludeIds")]
    pub exclude_ids: Vec<String>,
}
