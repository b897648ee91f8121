//! Static prediction records used when a submission has no persisted process results.

pub(crate) mod tables;

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::workflows::dataset::{static_property, PropertyIndex};

use super::scoring::PropensityTier;

/// One SHAP-style feature contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureAttribution {
    pub feature: String,
    pub contribution: f64,
}

/// Computer-vision and geospatial findings for a property.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VulnerabilityReport {
    pub roof_detection: RoofDetection,
    pub proximity: ProximityExposure,
    pub object_detection: ObjectDetection,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoofDetection {
    pub condition: String,
    pub damage_areas: Vec<String>,
    pub material: String,
    pub age_estimate: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityExposure {
    pub wildfire_zone: String,
    pub hurricane_zone: String,
    pub fault_line: String,
    pub flood_zone: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectDetection {
    pub findings: Vec<ObjectFinding>,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectFinding {
    pub label: String,
    pub confidence: f64,
    pub risk: String,
}

/// Named risk sub-score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskComponent {
    pub label: &'static str,
    pub score: f64,
}

/// Sub-scores derived from the total: vulnerability tracks the total, the others sit at fixed
/// offsets from it, floored at zero.
pub fn risk_breakdown(total_risk_score: f64) -> Vec<RiskComponent> {
    const OFFSETS: [(&str, f64); 5] = [
        ("Property Vulnerability Risk", 0.0),
        ("Property Condition Risk", 0.03),
        ("Locality Risk", -0.18),
        ("Claim History Risk", -0.26),
        ("Coverage Risk", -0.13),
    ];

    OFFSETS
        .iter()
        .map(|&(label, offset)| RiskComponent {
            label,
            score: (((total_risk_score + offset) * 100.0).round() / 100.0).max(0.0),
        })
        .collect()
}

/// Full reference prediction for one catalog position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRecord {
    #[serde(skip)]
    pub index: PropertyIndex,
    pub submission_id: String,
    pub state: String,
    pub occupancy_type: String,
    pub submission_channel: String,
    pub property_county: String,
    pub cover_type: String,
    pub broker_company: String,
    pub ai_risk: String,
    pub total_risk_score: f64,
    pub risk_breakdown: Vec<RiskComponent>,
    pub quote_propensity: f64,
    pub propensity_label: String,
    pub shap_values: Vec<FeatureAttribution>,
    pub vulnerability_data: VulnerabilityReport,
}

impl PredictionRecord {
    pub fn tier(&self) -> PropensityTier {
        PropensityTier::from_label(&self.propensity_label)
    }
}

pub fn prediction_records() -> &'static [PredictionRecord] {
    static RECORDS: OnceLock<Vec<PredictionRecord>> = OnceLock::new();
    RECORDS.get_or_init(|| PropertyIndex::all().map(build_record).collect())
}

pub fn prediction_record(index: PropertyIndex) -> &'static PredictionRecord {
    &prediction_records()[index.position()]
}

/// Submission-independent feature importance across the whole model.
pub fn global_feature_importance() -> Vec<FeatureAttribution> {
    tables::global_importance()
}

fn build_record(index: PropertyIndex) -> PredictionRecord {
    let property = static_property(index);
    let score = &tables::MODEL_SCORES[index.position()];
    let (quote_propensity, propensity_label) = tables::PROPENSITY[index.position()];

    PredictionRecord {
        index,
        submission_id: index.static_code().to_string(),
        state: property.state.clone(),
        occupancy_type: property.occupancy_type.clone(),
        submission_channel: property.submission_channel.clone(),
        property_county: property.property_county.clone(),
        cover_type: property.cover_type.clone(),
        broker_company: property.broker_company.clone(),
        ai_risk: score.ai_risk.to_string(),
        total_risk_score: score.total_risk_score,
        risk_breakdown: risk_breakdown(score.total_risk_score),
        quote_propensity,
        propensity_label: propensity_label.to_string(),
        shap_values: tables::shap_values(index),
        vulnerability_data: tables::vulnerability(index),
    }
}
