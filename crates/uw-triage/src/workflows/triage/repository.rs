use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;

use super::domain::{NewSubmission, Submission, SubmissionId};
use super::pipeline::PredictionOutcome;
use super::predictions::{FeatureAttribution, VulnerabilityReport};

/// One persisted model output for a (submission, property) pair. Columns may be null in rows
/// written by older builds, so every model field is optional.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessResultRecord {
    pub submission_id: SubmissionId,
    pub property_id: i64,
    pub ai_risk: Option<String>,
    pub quote_propensity: Option<f64>,
    pub total_risk_score: Option<f64>,
    pub shap_values: Vec<FeatureAttribution>,
    pub vulnerability_data: Option<VulnerabilityReport>,
}

impl ProcessResultRecord {
    pub fn from_outcome(submission_id: SubmissionId, outcome: &PredictionOutcome) -> Self {
        Self {
            submission_id,
            property_id: outcome.property_id,
            ai_risk: Some(outcome.ai_risk.clone()),
            quote_propensity: Some(outcome.quote_propensity),
            total_risk_score: Some(outcome.total_risk_score),
            shap_values: outcome.shap_values.clone(),
            vulnerability_data: outcome.vulnerability_data.clone(),
        }
    }
}

/// Scored submission as it appears on the leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardRow {
    pub submission_id: SubmissionId,
    pub underwriter_name: String,
    pub score: f64,
    pub created_at: Option<NaiveDateTime>,
}

/// Storage abstraction so the service can be exercised against memory or SQLite.
#[async_trait]
pub trait TriageRepository: Send + Sync {
    /// Persists a validated submission; the returned record has no `created_at` yet.
    async fn insert_submission(&self, submission: NewSubmission)
        -> Result<Submission, RepositoryError>;
    async fn fetch_submission(&self, id: SubmissionId)
        -> Result<Option<Submission>, RepositoryError>;
    async fn latest_submission(&self) -> Result<Option<Submission>, RepositoryError>;
    /// Deletes prior rows for the submission and inserts `outcomes`; returns rows written.
    async fn replace_process_results(
        &self,
        id: SubmissionId,
        outcomes: &[PredictionOutcome],
    ) -> Result<usize, RepositoryError>;
    /// Rows for the submission ordered by property id.
    async fn process_results(
        &self,
        id: SubmissionId,
    ) -> Result<Vec<ProcessResultRecord>, RepositoryError>;
    async fn record_score(&self, id: SubmissionId, score: f64) -> Result<(), RepositoryError>;
    /// Scored submissions by score descending, then creation ascending.
    async fn leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardRow>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("stored data is corrupt: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(value: sqlx::Error) -> Self {
        match value {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                Self::Corrupt(value.to_string())
            }
            other => Self::Unavailable(other.to_string()),
        }
    }
}
