//! Reference model output for the six catalog properties, indexed by `PropertyIndex`.

use crate::workflows::dataset::PropertyIndex;

use super::{
    FeatureAttribution, ObjectDetection, ObjectFinding, ProximityExposure, RoofDetection,
    VulnerabilityReport,
};

pub(crate) const DETECTION_MODEL: &str = "YOLOv8-property-v2";

/// Output of the scoring model run by the mock pipeline.
pub(crate) struct ModelScore {
    pub(crate) ai_risk: &'static str,
    pub(crate) quote_propensity: f64,
    pub(crate) total_risk_score: f64,
}

pub(crate) const MODEL_SCORES: [ModelScore; PropertyIndex::COUNT] = [
    ModelScore { ai_risk: "Medium", quote_propensity: 0.68, total_risk_score: 0.62 },
    ModelScore { ai_risk: "High", quote_propensity: 0.82, total_risk_score: 0.81 },
    ModelScore { ai_risk: "Low", quote_propensity: 0.35, total_risk_score: 0.30 },
    ModelScore { ai_risk: "High", quote_propensity: 0.77, total_risk_score: 0.78 },
    ModelScore { ai_risk: "Medium", quote_propensity: 0.61, total_risk_score: 0.55 },
    ModelScore { ai_risk: "Low", quote_propensity: 0.28, total_risk_score: 0.25 },
];

/// Calibrated quote propensity and its label, as published to the triage teams.
pub(crate) const PROPENSITY: [(f64, &str); PropertyIndex::COUNT] = [
    (0.8980, "High Propensity"),
    (0.9307, "High Propensity"),
    (0.8465, "High Propensity"),
    (0.4319, "Mid Propensity"),
    (0.4517, "Mid Propensity"),
    (0.0357, "Low Propensity"),
];

const SHAP: [[(&str, f64); 10]; PropertyIndex::COUNT] = [
    [
        ("annual_income", 1.050),
        ("building_coverage_limit", 0.853),
        ("cover_type_Building_Only", 0.692),
        ("Property_past_loss_freq", 0.519),
        ("construction_permit_Valid", 0.345),
        ("property_age", 0.276),
        ("total_risk_score", 0.250),
        ("Local_Crime_Rate", -0.247),
        ("roof_material_Wood", 0.217),
        ("Local_Fire_Incident_Rate", -0.203),
    ],
    [
        ("property_age", 1.20),
        ("Local_Fire_Incident_Rate", 0.95),
        ("roof_material_Wood", 0.88),
        ("Property_past_loss_freq", 0.72),
        ("Wildfire_Exposure", 0.65),
        ("building_coverage_limit", -0.41),
        ("construction_permit_Valid", -0.38),
        ("Local_Crime_Rate", 0.35),
        ("annual_income", -0.29),
        ("cover_type_Building_Only", 0.21),
    ],
    [
        ("annual_income", -0.92),
        ("building_coverage_limit", -0.78),
        ("property_age", -0.64),
        ("construction_permit_Valid", 0.42),
        ("Local_Crime_Rate", -0.38),
        ("cover_type_Building_Only", -0.31),
        ("Local_Fire_Incident_Rate", 0.28),
        ("Property_past_loss_freq", -0.22),
        ("roof_material_Wood", 0.18),
        ("total_risk_score", -0.15),
    ],
    [
        ("property_age", 1.45),
        ("Wildfire_Exposure", 1.12),
        ("Local_Fire_Incident_Rate", 0.98),
        ("roof_material_Wood", 0.82),
        ("Property_past_loss_freq", 0.74),
        ("Local_Crime_Rate", 0.58),
        ("total_risk_score", 0.51),
        ("building_coverage_limit", -0.39),
        ("annual_income", -0.28),
        ("construction_permit_Valid", -0.21),
    ],
    [
        ("annual_income", 0.88),
        ("cover_type_Building_Only", 0.72),
        ("building_coverage_limit", 0.64),
        ("property_age", -0.55),
        ("Property_past_loss_freq", 0.48),
        ("Local_Crime_Rate", -0.41),
        ("construction_permit_Valid", 0.35),
        ("roof_material_Wood", 0.29),
        ("Wildfire_Exposure", -0.22),
        ("total_risk_score", 0.18),
    ],
    [
        ("annual_income", -0.75),
        ("property_age", -0.62),
        ("building_coverage_limit", -0.54),
        ("construction_permit_Valid", -0.45),
        ("Local_Crime_Rate", 0.38),
        ("Property_past_loss_freq", -0.32),
        ("roof_material_Wood", 0.28),
        ("cover_type_Building_Only", -0.24),
        ("Local_Fire_Incident_Rate", 0.20),
        ("total_risk_score", -0.16),
    ],
];

const GLOBAL_IMPORTANCE: [(&str, f64); 7] = [
    ("Property Condition Risk", 0.32),
    ("Wildfire Exposure", 0.27),
    ("Roof Material (Wood)", 0.21),
    ("Past Claim Frequency", 0.18),
    ("Local Crime Rate", 0.15),
    ("Building Coverage Limit", -0.12),
    ("Annual Income", -0.09),
];

struct VulnerabilitySeed {
    condition: &'static str,
    damage_areas: &'static [&'static str],
    material: &'static str,
    age_estimate: &'static str,
    confidence: f64,
    wildfire_zone: &'static str,
    hurricane_zone: &'static str,
    fault_line: &'static str,
    flood_zone: &'static str,
    findings: &'static [(&'static str, f64, &'static str)],
}

const VULNERABILITY: [VulnerabilitySeed; PropertyIndex::COUNT] = [
    VulnerabilitySeed {
        condition: "Fair",
        damage_areas: &["NW corner wear", "Flashing separation at chimney"],
        material: "Asphalt Shingle",
        age_estimate: "16-20 years",
        confidence: 0.87,
        wildfire_zone: "Moderate (2.8 mi to WUI boundary)",
        hurricane_zone: "Category 1 exposure",
        fault_line: "4.2 mi to nearest active fault",
        flood_zone: "Zone X (minimal risk)",
        findings: &[
            ("Roof surface wear", 0.91, "Medium"),
            ("Overhanging tree", 0.84, "Low"),
            ("HVAC unit proximity", 0.78, "Low"),
        ],
    },
    VulnerabilitySeed {
        condition: "Poor",
        damage_areas: &[
            "Missing shingles (east section)",
            "Visible granule loss",
            "Moss growth",
        ],
        material: "Wood Shake",
        age_estimate: "22-28 years",
        confidence: 0.92,
        wildfire_zone: "High (0.9 mi to WUI boundary)",
        hurricane_zone: "Category 2-3 exposure",
        fault_line: "1.8 mi to active fault",
        flood_zone: "Zone AE (high risk)",
        findings: &[
            ("Missing shingles", 0.95, "High"),
            ("Dense vegetation", 0.89, "High"),
            ("Cracked chimney cap", 0.83, "Medium"),
            ("Blocked gutters", 0.77, "Medium"),
        ],
    },
    VulnerabilitySeed {
        condition: "Excellent",
        damage_areas: &[],
        material: "Metal Standing Seam",
        age_estimate: "3-6 years",
        confidence: 0.96,
        wildfire_zone: "Low (6.1 mi to WUI boundary)",
        hurricane_zone: "Category 1 exposure (coastal setback met)",
        fault_line: "12.4 mi to nearest fault",
        flood_zone: "Zone X (minimal risk)",
        findings: &[
            ("Solar panel installation", 0.93, "Low"),
            ("New guttering system", 0.88, "Low"),
        ],
    },
    VulnerabilitySeed {
        condition: "Critical",
        damage_areas: &[
            "Sagging ridge line",
            "Multiple missing tiles",
            "Water staining visible",
            "Structural deformation",
        ],
        material: "Clay Tile",
        age_estimate: "32-40 years",
        confidence: 0.94,
        wildfire_zone: "Very High (0.3 mi to WUI boundary)",
        hurricane_zone: "Category 3-4 exposure",
        fault_line: "0.9 mi to active fault",
        flood_zone: "Zone A (high risk, no BFE)",
        findings: &[
            ("Severe roof damage", 0.97, "High"),
            ("Foundation cracks", 0.88, "High"),
            ("Dead trees (3)", 0.92, "High"),
            ("Debris accumulation", 0.85, "Medium"),
            ("Deck structural wear", 0.79, "Medium"),
        ],
    },
    VulnerabilitySeed {
        condition: "Good",
        damage_areas: &["Minor granule loss (south slope)"],
        material: "Asphalt Shingle",
        age_estimate: "10-14 years",
        confidence: 0.89,
        wildfire_zone: "Low-Moderate (3.5 mi to WUI boundary)",
        hurricane_zone: "Category 1 exposure",
        fault_line: "7.2 mi to nearest fault",
        flood_zone: "Zone X (minimal risk)",
        findings: &[
            ("Minor shingle wear", 0.86, "Low"),
            ("Pool proximity", 0.91, "Low"),
            ("Driveway in good repair", 0.82, "Low"),
        ],
    },
    VulnerabilitySeed {
        condition: "Good",
        damage_areas: &[],
        material: "Composite Shingle",
        age_estimate: "6-9 years",
        confidence: 0.91,
        wildfire_zone: "Low (5.2 mi to WUI boundary)",
        hurricane_zone: "Category 1 exposure",
        fault_line: "9.8 mi to nearest fault",
        flood_zone: "Zone X (minimal risk)",
        findings: &[
            ("Clean roof surface", 0.94, "Low"),
            ("Well-maintained yard", 0.87, "Low"),
        ],
    },
];

fn attributions(pairs: &[(&str, f64)]) -> Vec<FeatureAttribution> {
    pairs
        .iter()
        .map(|(feature, contribution)| FeatureAttribution {
            feature: feature.to_string(),
            contribution: *contribution,
        })
        .collect()
}

pub(crate) fn shap_values(index: PropertyIndex) -> Vec<FeatureAttribution> {
    attributions(&SHAP[index.position()])
}

pub(crate) fn global_importance() -> Vec<FeatureAttribution> {
    attributions(&GLOBAL_IMPORTANCE)
}

pub(crate) fn vulnerability(index: PropertyIndex) -> VulnerabilityReport {
    let seed = &VULNERABILITY[index.position()];
    VulnerabilityReport {
        roof_detection: RoofDetection {
            condition: seed.condition.to_string(),
            damage_areas: seed.damage_areas.iter().map(|s| s.to_string()).collect(),
            material: seed.material.to_string(),
            age_estimate: seed.age_estimate.to_string(),
            confidence: seed.confidence,
        },
        proximity: ProximityExposure {
            wildfire_zone: seed.wildfire_zone.to_string(),
            hurricane_zone: seed.hurricane_zone.to_string(),
            fault_line: seed.fault_line.to_string(),
            flood_zone: seed.flood_zone.to_string(),
        },
        object_detection: ObjectDetection {
            findings: seed
                .findings
                .iter()
                .map(|(label, confidence, risk)| ObjectFinding {
                    label: label.to_string(),
                    confidence: *confidence,
                    risk: risk.to_string(),
                })
                .collect(),
            model: DETECTION_MODEL.to_string(),
        },
    }
}
