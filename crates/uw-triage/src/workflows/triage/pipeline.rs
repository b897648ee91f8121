//! Prediction pipeline. A real model sits behind [`InferenceModel`]; whenever it fails the
//! pipeline degrades to deterministic reference output instead of surfacing the error.

use serde::Serialize;
use tracing::{debug, warn};

use crate::workflows::dataset::PropertyIndex;
use crate::workflows::sourced::{FallbackReason, Sourced};

use super::predictions::tables::{self, MODEL_SCORES};
use super::predictions::{FeatureAttribution, VulnerabilityReport};

const NEUTRAL_RISK: &str = "Medium";
const NEUTRAL_PROPENSITY: f64 = 0.5;
const NEUTRAL_RISK_SCORE: f64 = 0.5;

/// Model output for one property number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionOutcome {
    pub property_id: i64,
    pub ai_risk: String,
    pub quote_propensity: f64,
    pub total_risk_score: f64,
    pub shap_values: Vec<FeatureAttribution>,
    pub vulnerability_data: Option<VulnerabilityReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineFailure {
    #[error("model not integrated")]
    NotIntegrated,
    #[error("inference failed: {0}")]
    Inference(String),
}

/// Seam for a trained propensity/risk model.
pub trait InferenceModel: Send + Sync {
    fn predict(&self, property_ids: &[i64]) -> Result<Vec<PredictionOutcome>, PipelineFailure>;
}

/// Placeholder for the production model; always fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableModel;

impl InferenceModel for UnavailableModel {
    fn predict(&self, _property_ids: &[i64]) -> Result<Vec<PredictionOutcome>, PipelineFailure> {
        Err(PipelineFailure::NotIntegrated)
    }
}

pub struct PredictionPipeline {
    model: Box<dyn InferenceModel>,
}

impl Default for PredictionPipeline {
    fn default() -> Self {
        Self::new(UnavailableModel)
    }
}

impl PredictionPipeline {
    pub fn new<M>(model: M) -> Self
    where
        M: InferenceModel + 'static,
    {
        Self {
            model: Box::new(model),
        }
    }

    /// One outcome per input id, in input order.
    pub fn run(&self, property_ids: &[i64]) -> Sourced<Vec<PredictionOutcome>> {
        match self.model.predict(property_ids) {
            Ok(outcomes) => {
                debug!(count = outcomes.len(), "model inference completed");
                Sourced::Primary(outcomes)
            }
            Err(err) => {
                warn!(error = %err, "model inference failed; using reference predictions");
                Sourced::Fallback(
                    mock_outcomes(property_ids),
                    FallbackReason::ModelUnavailable(err.to_string()),
                )
            }
        }
    }
}

/// Deterministic reference output; ids outside the catalog get a neutral default.
pub fn mock_outcomes(property_ids: &[i64]) -> Vec<PredictionOutcome> {
    property_ids
        .iter()
        .map(|&property_id| match PropertyIndex::from_property_id(property_id) {
            Some(index) => {
                let score = &MODEL_SCORES[index.position()];
                PredictionOutcome {
                    property_id,
                    ai_risk: score.ai_risk.to_string(),
                    quote_propensity: score.quote_propensity,
                    total_risk_score: score.total_risk_score,
                    shap_values: tables::shap_values(index),
                    vulnerability_data: Some(tables::vulnerability(index)),
                }
            }
            None => PredictionOutcome {
                property_id,
                ai_risk: NEUTRAL_RISK.to_string(),
                quote_propensity: NEUTRAL_PROPENSITY,
                total_risk_score: NEUTRAL_RISK_SCORE,
                shap_values: Vec::new(),
                vulnerability_data: None,
            },
        })
        .collect()
}
