use std::sync::Arc;

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{info, warn};

use crate::workflows::dataset::{Property, PropertyDataset, PropertyIndex};
use crate::workflows::notify::{
    tier_groups, DispatchReport, LetterKind, NotificationDispatcher, TierGroups,
};

use super::domain::{NewSubmission, SelectionOverlap, Submission, SubmissionId};
use super::pipeline::PredictionPipeline;
use super::predictions::prediction_record;
use super::repository::{RepositoryError, TriageRepository};
use super::results::{ResultAssembler, ResultsView};
use super::scoring::PropensityTier;

pub const LEADERBOARD_SIZE: usize = 10;

/// Returned by a processing run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessSummary {
    #[serde(rename = "processId")]
    pub process_id: SubmissionId,
    pub status: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub submission_id: SubmissionId,
    pub underwriter_name: String,
    pub score_percentage: f64,
    pub created_at: Option<NaiveDateTime>,
}

/// Live property annotated with its reference propensity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriagedProperty {
    #[serde(flatten)]
    pub property: Property,
    pub propensity_tier: PropensityTier,
    pub propensity_label: String,
    pub propensity_score: f64,
}

/// Service composing the store, property dataset, prediction pipeline, and mail dispatcher.
pub struct TriageService<R> {
    repository: Arc<R>,
    dataset: PropertyDataset,
    pipeline: PredictionPipeline,
    notifier: NotificationDispatcher,
}

impl<R> TriageService<R>
where
    R: TriageRepository + 'static,
{
    pub fn new(
        repository: Arc<R>,
        dataset: PropertyDataset,
        notifier: NotificationDispatcher,
    ) -> Self {
        Self {
            repository,
            dataset,
            pipeline: PredictionPipeline::default(),
            notifier,
        }
    }

    pub fn with_pipeline(mut self, pipeline: PredictionPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Validates the selection lists are disjoint, then persists.
    pub async fn create_submission(
        &self,
        submission: NewSubmission,
    ) -> Result<Submission, TriageServiceError> {
        submission.validate()?;
        Ok(self.repository.insert_submission(submission).await?)
    }

    pub async fn submission(&self, id: SubmissionId) -> Result<Submission, TriageServiceError> {
        self.repository
            .fetch_submission(id)
            .await?
            .ok_or(TriageServiceError::SubmissionNotFound(id))
    }

    pub async fn latest_submission(&self) -> Result<Option<Submission>, TriageServiceError> {
        Ok(self.repository.latest_submission().await?)
    }

    /// Runs the pipeline over every property and replaces the submission's stored results.
    pub async fn process(&self, id: SubmissionId) -> Result<ProcessSummary, TriageServiceError> {
        self.submission(id).await?;

        let property_ids: Vec<i64> = PropertyIndex::all().map(PropertyIndex::property_id).collect();
        let outcomes = self.pipeline.run(&property_ids).into_inner();
        let count = self
            .repository
            .replace_process_results(id, &outcomes)
            .await?;

        info!(submission_id = %id, count, "processed submission");
        Ok(ProcessSummary {
            process_id: id,
            status: "completed",
            count,
        })
    }

    /// Assembles the results view and stores its score on the submission. Unknown ids get a
    /// reference-only view and nothing is written.
    pub async fn results(&self, id: SubmissionId) -> Result<ResultsView, TriageServiceError> {
        let properties = self.dataset.properties();
        let assembler = ResultAssembler::new(&properties);

        let Some(submission) = self.repository.fetch_submission(id).await? else {
            let view = assembler.demo(id);
            if let Some(reason) = view.reason() {
                warn!(submission_id = %id, %reason, "serving demo results");
            }
            return Ok(view.into_inner());
        };

        let rows = self.repository.process_results(id).await?;
        let view = assembler.assemble(&submission, &rows);
        if let Some(reason) = view.reason() {
            warn!(submission_id = %id, %reason, "scoring against reference predictions");
        }
        let view = view.into_inner();

        self.repository
            .record_score(id, view.score_percentage)
            .await?;
        info!(submission_id = %id, score = view.score_percentage, "recorded alignment score");
        Ok(view)
    }

    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, TriageServiceError> {
        let rows = self.repository.leaderboard(LEADERBOARD_SIZE).await?;
        Ok(rows
            .into_iter()
            .take(LEADERBOARD_SIZE)
            .enumerate()
            .map(|(position, row)| LeaderboardEntry {
                rank: position + 1,
                submission_id: row.submission_id,
                underwriter_name: row.underwriter_name,
                score_percentage: row.score,
                created_at: row.created_at,
            })
            .collect())
    }

    pub fn properties(&self) -> Vec<Property> {
        self.dataset.properties()
    }

    pub fn property(&self, identifier: &str) -> Result<Property, TriageServiceError> {
        self.dataset
            .find(identifier)
            .ok_or_else(|| TriageServiceError::PropertyNotFound(identifier.to_string()))
    }

    pub fn tiers(&self) -> TierGroups {
        tier_groups(&self.dataset.properties())
    }

    /// Property by live submission code, with its propensity tier.
    pub fn triage_property(&self, code: &str) -> Result<TriagedProperty, TriageServiceError> {
        let property = self
            .dataset
            .properties()
            .into_iter()
            .find(|property| property.submission_id == code.trim())
            .ok_or_else(|| TriageServiceError::PropertyNotFound(code.to_string()))?;

        let reference = prediction_record(property.index);
        Ok(TriagedProperty {
            propensity_tier: reference.tier(),
            propensity_label: reference.propensity_label.clone(),
            propensity_score: reference.quote_propensity,
            property,
        })
    }

    pub async fn send_digests(&self) -> DispatchReport {
        self.send_digests_on(today()).await
    }

    pub async fn send_digests_on(&self, day: NaiveDate) -> DispatchReport {
        self.notifier.send_digests(&self.tiers(), day).await
    }

    pub async fn send_letter(
        &self,
        kind: LetterKind,
        code: &str,
        broker_email: Option<String>,
    ) -> Result<DispatchReport, TriageServiceError> {
        let property = self.triage_property(code)?.property;
        Ok(self
            .notifier
            .send_letter(kind, &property, broker_email, today())
            .await)
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Debug, thiserror::Error)]
pub enum TriageServiceError {
    #[error(transparent)]
    Validation(#[from] SelectionOverlap),
    #[error("submission {0} not found")]
    SubmissionNotFound(SubmissionId),
    #[error("property {0} not found")]
    PropertyNotFound(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
