//! Deterministic spending predictor
//!
//! Evaluates a linear regression over a one-hot season encoding:
//! `prediction = intercept + sum(coefficient_i * feature_i)`. The model is
//! loaded once at startup from a JSON artifact (coefficients exported from
//! offline training); if the artifact is missing or malformed, a hard-coded
//! coefficient set keeps predictions deterministic in degraded mode.

use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::models::{round2, MonthKey, SeasonFeatures, SpendingPrediction};

/// Placeholder confidence until a training metric is exported with the model
const CONFIDENCE: f64 = 0.85;

/// Default artifact location, overridable via `FOOTPRINT_MODEL_PATH`
pub const DEFAULT_MODEL_PATH: &str = "model/linear_regression.json";

/// Trained linear-regression artifact
///
/// `feature_names[i]` pairs with `coefficients[i]`; names the encoder does
/// not recognize contribute zero.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionModel {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub feature_names: Vec<String>,
}

impl PredictionModel {
    /// Load the artifact from disk, falling back to built-in coefficients
    ///
    /// Absence of the artifact is non-fatal: predictions stay deterministic,
    /// just trained on nothing better than typical spending patterns.
    pub fn load_or_fallback(path: &Path) -> Self {
        match Self::load(path) {
            Ok(model) => {
                info!(path = %path.display(), features = ?model.feature_names, "Loaded prediction model");
                model
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not load prediction model; using fallback coefficients");
                Self::fallback()
            }
        }
    }

    fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let model: Self = serde_json::from_str(&raw)?;
        if model.coefficients.len() != model.feature_names.len() {
            anyhow::bail!(
                "coefficient/feature length mismatch: {} vs {}",
                model.coefficients.len(),
                model.feature_names.len()
            );
        }
        Ok(model)
    }

    /// Fallback coefficients based on typical seasonal spending patterns
    pub fn fallback() -> Self {
        Self {
            coefficients: vec![200.0, 300.0, 100.0, 150.0],
            intercept: 1000.0,
            feature_names: vec![
                "season_Spring".to_string(),
                "season_Summer".to_string(),
                "season_Fall".to_string(),
                "season_Winter".to_string(),
            ],
        }
    }
}

/// Pure, deterministic spending predictor
///
/// No I/O per call; the model is owned for the process lifetime.
#[derive(Debug, Clone)]
pub struct SpendingPredictor {
    model: PredictionModel,
}

impl SpendingPredictor {
    pub fn new(model: PredictionModel) -> Self {
        Self { model }
    }

    /// Load the model from the configured artifact path (or fallback)
    pub fn from_env() -> Self {
        let path = std::env::var("FOOTPRINT_MODEL_PATH")
            .unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string());
        Self::new(PredictionModel::load_or_fallback(Path::new(&path)))
    }

    /// Predict spending for a month from its season encoding
    pub fn predict(&self, month: MonthKey) -> SpendingPrediction {
        let season = month.season();
        let features = SeasonFeatures::encode(season);

        let mut prediction = self.model.intercept;
        for (name, coefficient) in self
            .model
            .feature_names
            .iter()
            .zip(self.model.coefficients.iter())
        {
            prediction += coefficient * features.by_name(name);
        }

        SpendingPrediction {
            month,
            season,
            predicted_spending: round2(prediction),
            features,
            confidence: CONFIDENCE,
        }
    }
}
