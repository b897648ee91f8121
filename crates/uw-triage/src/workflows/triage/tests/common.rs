use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::config::MailConfig;
use crate::workflows::dataset::PropertyDataset;
use crate::workflows::notify::NotificationDispatcher;
use crate::workflows::triage::pipeline::PredictionOutcome;
use crate::workflows::triage::repository::{
    LeaderboardRow, ProcessResultRecord, RepositoryError, TriageRepository,
};
use crate::workflows::triage::{triage_router, NewSubmission, Submission, SubmissionId, TriageService};

pub(super) fn new_submission(name: &str, prioritized: &[&str], discarded: &[&str]) -> NewSubmission {
    NewSubmission {
        underwriter_name: name.to_string(),
        prioritized_ids: prioritized.iter().map(|id| id.to_string()).collect(),
        discarded_ids: discarded.iter().map(|id| id.to_string()).collect(),
    }
}

pub(super) fn build_service() -> (TriageService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = TriageService::new(
        repository.clone(),
        PropertyDataset::static_only(),
        NotificationDispatcher::new(&MailConfig::default(), None),
    );
    (service, repository)
}

pub(super) fn router_with_service(service: TriageService<MemoryRepository>) -> axum::Router {
    triage_router(Arc::new(service))
}

fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 1, 5)
        .and_then(|day| day.and_hms_opt(9, 0, 0))
        .expect("valid timestamp")
}

#[derive(Default)]
struct MemoryState {
    submissions: Vec<Submission>,
    results: HashMap<SubmissionId, Vec<ProcessResultRecord>>,
}

/// In-memory store. Every submission gets the same `created_at` so ordering falls to ids.
#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryRepository {
    pub(super) fn stored(&self, id: SubmissionId) -> Option<Submission> {
        let guard = self.state.lock().expect("repository mutex poisoned");
        guard.submissions.iter().find(|s| s.id == id).cloned()
    }

    pub(super) fn result_rows(&self, id: SubmissionId) -> usize {
        let guard = self.state.lock().expect("repository mutex poisoned");
        guard.results.get(&id).map_or(0, Vec::len)
    }
}

#[async_trait]
impl TriageRepository for MemoryRepository {
    async fn insert_submission(
        &self,
        submission: NewSubmission,
    ) -> Result<Submission, RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        let id = SubmissionId(guard.submissions.len() as i64 + 1);
        guard.submissions.push(Submission {
            id,
            underwriter_name: submission.underwriter_name.clone(),
            prioritized_ids: submission.prioritized_ids.clone(),
            discarded_ids: submission.discarded_ids.clone(),
            created_at: Some(base_time()),
            score: None,
        });
        Ok(Submission {
            id,
            underwriter_name: submission.underwriter_name,
            prioritized_ids: submission.prioritized_ids,
            discarded_ids: submission.discarded_ids,
            created_at: None,
            score: None,
        })
    }

    async fn fetch_submission(
        &self,
        id: SubmissionId,
    ) -> Result<Option<Submission>, RepositoryError> {
        Ok(self.stored(id))
    }

    async fn latest_submission(&self) -> Result<Option<Submission>, RepositoryError> {
        let guard = self.state.lock().expect("repository mutex poisoned");
        Ok(guard
            .submissions
            .iter()
            .max_by_key(|s| (s.created_at, s.id))
            .cloned())
    }

    async fn replace_process_results(
        &self,
        id: SubmissionId,
        outcomes: &[PredictionOutcome],
    ) -> Result<usize, RepositoryError> {
        let rows: Vec<ProcessResultRecord> = outcomes
            .iter()
            .map(|outcome| ProcessResultRecord::from_outcome(id, outcome))
            .collect();
        let count = rows.len();
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        guard.results.insert(id, rows);
        Ok(count)
    }

    async fn process_results(
        &self,
        id: SubmissionId,
    ) -> Result<Vec<ProcessResultRecord>, RepositoryError> {
        let guard = self.state.lock().expect("repository mutex poisoned");
        let mut rows = guard.results.get(&id).cloned().unwrap_or_default();
        rows.sort_by_key(|row| row.property_id);
        Ok(rows)
    }

    async fn record_score(&self, id: SubmissionId, score: f64) -> Result<(), RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        let submission = guard
            .submissions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(RepositoryError::NotFound)?;
        submission.score = Some(score);
        Ok(())
    }

    async fn leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardRow>, RepositoryError> {
        let guard = self.state.lock().expect("repository mutex poisoned");
        let mut scored: Vec<&Submission> =
            guard.submissions.iter().filter(|s| s.score.is_some()).collect();
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        Ok(scored
            .into_iter()
            .take(limit)
            .map(|s| LeaderboardRow {
                submission_id: s.id,
                underwriter_name: s.underwriter_name.clone(),
                score: s.score.unwrap_or_default(),
                created_at: s.created_at,
            })
            .collect())
    }
}

pub(super) struct UnavailableRepository;

#[async_trait]
impl TriageRepository for UnavailableRepository {
    async fn insert_submission(&self, _: NewSubmission) -> Result<Submission, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn fetch_submission(&self, _: SubmissionId) -> Result<Option<Submission>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn latest_submission(&self) -> Result<Option<Submission>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn replace_process_results(
        &self,
        _: SubmissionId,
        _: &[PredictionOutcome],
    ) -> Result<usize, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn process_results(
        &self,
        _: SubmissionId,
    ) -> Result<Vec<ProcessResultRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn record_score(&self, _: SubmissionId, _: f64) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn leaderboard(&self, _: usize) -> Result<Vec<LeaderboardRow>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
