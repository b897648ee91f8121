//! Joins a submission's selections with persisted or reference predictions into the results
//! view, and scores the selections against the propensity tiers.

use serde::Serialize;
use tracing::{debug, warn};

use crate::workflows::dataset::{Property, PropertyIndex};
use crate::workflows::sourced::{FallbackReason, Sourced};

use super::domain::{Submission, SubmissionId, UserSelection};
use super::predictions::{
    global_feature_importance, prediction_record, risk_breakdown, FeatureAttribution,
    RiskComponent, VulnerabilityReport,
};
use super::repository::ProcessResultRecord;
use super::scoring::{AlignmentScore, PropensityTier};

pub const DEMO_UNDERWRITER: &str = "Demo Underwriter";

/// Maps the opaque identifiers an underwriter submitted onto catalog positions.
///
/// Lookup order: live dataset code, static code (`SUB-24001`), letter, 1-based number.
#[derive(Debug, Clone, Copy)]
pub struct SelectionResolver<'a> {
    properties: &'a [Property],
}

impl<'a> SelectionResolver<'a> {
    pub fn new(properties: &'a [Property]) -> Self {
        Self { properties }
    }

    pub fn resolve(&self, identifier: &str) -> Option<PropertyIndex> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return None;
        }

        self.properties
            .iter()
            .find(|property| property.submission_id == identifier)
            .map(|property| property.index)
            .or_else(|| PropertyIndex::from_static_code(identifier))
            .or_else(|| PropertyIndex::from_letter(identifier))
            .or_else(|| {
                identifier
                    .parse::<i64>()
                    .ok()
                    .and_then(PropertyIndex::from_property_id)
            })
    }

    /// Selection per catalog position. An index reached from both lists counts as prioritized.
    pub fn selections(
        &self,
        prioritized: &[String],
        discarded: &[String],
    ) -> [Option<UserSelection>; PropertyIndex::COUNT] {
        let mut tags = [None; PropertyIndex::COUNT];

        for (ids, selection) in [
            (discarded, UserSelection::Discarded),
            (prioritized, UserSelection::Prioritized),
        ] {
            for id in ids {
                match self.resolve(id) {
                    Some(index) => tags[index.position()] = Some(selection),
                    None => debug!(identifier = %id, selection = selection.label(), "ignoring unknown property identifier"),
                }
            }
        }

        tags
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionSource {
    Persisted,
    Static,
}

/// One property's row in the results view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyResult {
    pub property_id: i64,
    pub letter: char,
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
    pub propensity_tier: PropensityTier,
    pub shap_values: Vec<FeatureAttribution>,
    pub vulnerability_data: VulnerabilityReport,
    pub user_selection: Option<UserSelection>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsView {
    pub submission_id: SubmissionId,
    pub underwriter_name: String,
    pub score_percentage: f64,
    pub prediction_source: PredictionSource,
    pub results: Vec<PropertyResult>,
    pub global_feature_importance: Vec<FeatureAttribution>,
}

impl ResultsView {
    pub fn alignment(&self) -> AlignmentScore {
        AlignmentScore::from_rows(
            self.results
                .iter()
                .map(|row| (row.propensity_tier, row.user_selection)),
        )
    }
}

/// Builds [`ResultsView`]s over the current property set. Pure: callers fetch and persist.
#[derive(Debug, Clone, Copy)]
pub struct ResultAssembler<'a> {
    properties: &'a [Property],
}

impl<'a> ResultAssembler<'a> {
    pub fn new(properties: &'a [Property]) -> Self {
        Self { properties }
    }

    /// Reference-only view for an id with no stored submission; nothing is selected.
    pub fn demo(&self, requested: SubmissionId) -> Sourced<ResultsView> {
        let view = self.build(requested, DEMO_UNDERWRITER, &[], &[], &[]);
        Sourced::Fallback(view, FallbackReason::UnknownSubmission)
    }

    pub fn assemble(
        &self,
        submission: &Submission,
        rows: &[ProcessResultRecord],
    ) -> Sourced<ResultsView> {
        let view = self.build(
            submission.id,
            &submission.underwriter_name,
            &submission.prioritized_ids,
            &submission.discarded_ids,
            rows,
        );

        if view.prediction_source == PredictionSource::Static {
            Sourced::Fallback(view, FallbackReason::NoPersistedResults)
        } else {
            Sourced::Primary(view)
        }
    }

    fn build(
        &self,
        submission_id: SubmissionId,
        underwriter_name: &str,
        prioritized: &[String],
        discarded: &[String],
        rows: &[ProcessResultRecord],
    ) -> ResultsView {
        let persisted = index_rows(rows);
        let prediction_source = if persisted.iter().any(Option::is_some) {
            PredictionSource::Persisted
        } else {
            PredictionSource::Static
        };
        let selections = SelectionResolver::new(self.properties).selections(prioritized, discarded);

        let results: Vec<PropertyResult> = PropertyIndex::all()
            .map(|index| {
                self.property_result(
                    index,
                    persisted[index.position()],
                    selections[index.position()],
                )
            })
            .collect();

        let score = AlignmentScore::from_rows(
            results
                .iter()
                .map(|row| (row.propensity_tier, row.user_selection)),
        );

        ResultsView {
            submission_id,
            underwriter_name: underwriter_name.to_string(),
            score_percentage: score.percentage,
            prediction_source,
            results,
            global_feature_importance: global_feature_importance(),
        }
    }

    fn property_result(
        &self,
        index: PropertyIndex,
        persisted: Option<&ProcessResultRecord>,
        user_selection: Option<UserSelection>,
    ) -> PropertyResult {
        let reference = prediction_record(index);
        let submission_id = self
            .properties
            .get(index.position())
            .map(|property| property.submission_id.clone())
            .unwrap_or_else(|| reference.submission_id.clone());

        let ai_risk = persisted
            .and_then(|row| row.ai_risk.as_deref())
            .filter(|risk| !risk.trim().is_empty())
            .unwrap_or(reference.ai_risk.as_str())
            .to_string();
        let total_risk_score = persisted
            .and_then(|row| row.total_risk_score)
            .unwrap_or(reference.total_risk_score);
        let quote_propensity = persisted
            .and_then(|row| row.quote_propensity)
            .unwrap_or(reference.quote_propensity);
        let shap_values = persisted
            .map(|row| &row.shap_values)
            .filter(|values| !values.is_empty())
            .unwrap_or(&reference.shap_values)
            .clone();
        let vulnerability_data = persisted
            .and_then(|row| row.vulnerability_data.clone())
            .unwrap_or_else(|| reference.vulnerability_data.clone());

        PropertyResult {
            property_id: index.property_id(),
            letter: index.letter(),
            submission_id,
            state: reference.state.clone(),
            occupancy_type: reference.occupancy_type.clone(),
            submission_channel: reference.submission_channel.clone(),
            property_county: reference.property_county.clone(),
            cover_type: reference.cover_type.clone(),
            broker_company: reference.broker_company.clone(),
            ai_risk,
            total_risk_score,
            risk_breakdown: risk_breakdown(total_risk_score),
            quote_propensity,
            propensity_label: reference.propensity_label.clone(),
            propensity_tier: reference.tier(),
            shap_values,
            vulnerability_data,
            user_selection,
        }
    }
}

fn index_rows(
    rows: &[ProcessResultRecord],
) -> [Option<&ProcessResultRecord>; PropertyIndex::COUNT] {
    let mut slots = [None; PropertyIndex::COUNT];
    for row in rows {
        match PropertyIndex::from_property_id(row.property_id) {
            Some(index) => slots[index.position()] = Some(row),
            None => warn!(
                submission_id = %row.submission_id,
                property_id = row.property_id,
                "skipping process result outside the property set"
            ),
        }
    }
    slots
}
