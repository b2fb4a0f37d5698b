use crate::core::normalizer::PredictorFeatures;
use crate::models::{PredictionOutcome, PredictionSet};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when calling the price prediction service
#[derive(Debug, Error)]
pub enum PredictorError {
    #[error("HTTP client could not be built: {0}")]
    ClientBuild(reqwest::Error),

    #[error("request timed out after {0} ms")]
    Timeout(u64),

    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("service returned status {0}")]
    Status(u16),

    #[error("invalid response format: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    properties: &'a [PredictorFeatures],
}

/// Price prediction service client
///
/// Sends one batch per recommendation request and never surfaces a failure
/// to the caller: every error becomes a fallback outcome.
pub struct PredictorClient {
    predict_url: String,
    health_url: String,
    timeout_ms: u64,
    client: Client,
}

impl PredictorClient {
    /// Create a new predictor client
    pub fn new(
        base_url: &str,
        predict_path: &str,
        health_path: &str,
        timeout_ms: u64,
    ) -> Result<Self, PredictorError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(PredictorError::ClientBuild)?;

        let base = base_url.trim_end_matches('/');
        Ok(Self {
            predict_url: format!("{}/{}", base, predict_path.trim_start_matches('/')),
            health_url: format!("{}/{}", base, health_path.trim_start_matches('/')),
            timeout_ms,
            client,
        })
    }

    pub fn predict_url(&self) -> &str {
        &self.predict_url
    }

    /// Price a batch of properties
    ///
    /// An empty batch is not sent.
    pub async fn predict(&self, batch: &[PredictorFeatures]) -> PredictionOutcome {
        if batch.is_empty() {
            return PredictionOutcome::Skipped {
                reason: "no properties to price".to_string(),
            };
        }

        match self.request_predictions(batch).await {
            Ok(set) if set.is_empty() => {
                tracing::info!(
                    "Price model returned no usable predictions for {} properties",
                    batch.len()
                );
                PredictionOutcome::Empty
            }
            Ok(set) => {
                tracing::debug!("Price model priced {}/{} properties", set.len(), batch.len());
                PredictionOutcome::Predicted(set)
            }
            Err(e) => {
                tracing::warn!("Price model call failed, falling back to rule scores: {}", e);
                PredictionOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn request_predictions(
        &self,
        batch: &[PredictorFeatures],
    ) -> Result<PredictionSet, PredictorError> {
        tracing::debug!("Requesting {} predictions from: {}", batch.len(), self.predict_url);

        let response = self
            .client
            .post(&self.predict_url)
            .json(&PredictRequest { properties: batch })
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        if !response.status().is_success() {
            return Err(PredictorError::Status(response.status().as_u16()));
        }

        let json: Value = response.json().await.map_err(|e| self.classify(e))?;
        parse_predictions(&json)
    }

    fn classify(&self, err: reqwest::Error) -> PredictorError {
        if err.is_timeout() {
            PredictorError::Timeout(self.timeout_ms)
        } else if err.is_decode() {
            PredictorError::InvalidResponse(err.to_string())
        } else {
            PredictorError::RequestError(err)
        }
    }

    /// Whether the service answers its health endpoint
    pub async fn health_check(&self) -> Result<bool, PredictorError> {
        let response = self
            .client
            .get(&self.health_url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        Ok(response.status().is_success())
    }
}

/// Extract usable predictions from a response body
///
/// `predictions` must be an object keyed by property id. Entries whose
/// `predicted_price` is missing, non-numeric or non-positive are dropped.
pub fn parse_predictions(json: &Value) -> Result<PredictionSet, PredictorError> {
    let predictions = json
        .get("predictions")
        .and_then(Value::as_object)
        .ok_or_else(|| PredictorError::InvalidResponse("Missing predictions object".into()))?;

    let mut set = PredictionSet::new();
    for (id, entry) in predictions {
        match entry.get("predicted_price").and_then(Value::as_f64) {
            Some(price) if set.insert(id.clone(), price) => {}
            _ => tracing::debug!("Discarding unusable prediction for property {}", id),
        }
    }

    Ok(set)
}
