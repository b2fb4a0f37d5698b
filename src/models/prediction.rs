use std::collections::HashMap;

/// Predicted fair prices keyed by property id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionSet {
    prices: HashMap<String, f64>,
}

impl PredictionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a prediction; non-finite or non-positive prices are ignored
    pub fn insert(&mut self, id: impl Into<String>, price: f64) -> bool {
        if price.is_finite() && price > 0.0 {
            self.prices.insert(id.into(), price);
            true
        } else {
            false
        }
    }

    pub fn get(&self, id: &str) -> Option<f64> {
        self.prices.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl FromIterator<(String, f64)> for PredictionSet {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut set = PredictionSet::new();
        for (id, price) in iter {
            set.insert(id, price);
        }
        set
    }
}

/// Result of consulting the price predictor for one request
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionOutcome {
    /// At least one usable prediction came back
    Predicted(PredictionSet),
    /// The call succeeded but nothing usable came back
    Empty,
    /// Transport error, timeout, non-success status or malformed payload
    Failed { reason: String },
    /// The predictor was not called
    Skipped { reason: String },
}

impl PredictionOutcome {
    /// Wrap a set, collapsing an empty one to `Empty`
    pub fn from_set(set: PredictionSet) -> Self {
        if set.is_empty() {
            PredictionOutcome::Empty
        } else {
            PredictionOutcome::Predicted(set)
        }
    }

    pub fn price_for(&self, id: &str) -> Option<f64> {
        match self {
            PredictionOutcome::Predicted(set) => set.get(id),
            _ => None,
        }
    }

    pub fn ml_used(&self) -> bool {
        matches!(self, PredictionOutcome::Predicted(_))
    }

    /// Caller-facing explanation of why ranking fell back to rule scores
    pub fn fallback_message(&self) -> Option<String> {
        match self {
            PredictionOutcome::Predicted(_) => None,
            PredictionOutcome::Empty => Some(
                "Price model returned no usable predictions; results are ranked by rule-based scores only."
                    .to_string(),
            ),
            PredictionOutcome::Failed { reason } => Some(format!(
                "Price model unavailable ({reason}); results are ranked by rule-based scores only."
            )),
            PredictionOutcome::Skipped { reason } => Some(format!(
                "Price model not consulted ({reason}); results are ranked by rule-based scores only."
            )),
        }
    }
}
