use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::workflows::notify::{tier_counts, LetterKind};

use super::domain::{NewSubmission, SubmissionId};
use super::repository::TriageRepository;
use super::service::{TriageService, TriageServiceError};

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ProcessRequest {
    #[serde(rename = "submissionId")]
    pub submission_id: SubmissionId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LetterRequest {
    pub kind: LetterKind,
    pub submission_id: String,
    #[serde(default)]
    pub broker_email: Option<String>,
}

/// Router exposing submissions, processing, results, leaderboard, properties, and the triage
/// notification helpers under `/api`.
pub fn triage_router<R>(service: Arc<TriageService<R>>) -> Router
where
    R: TriageRepository + 'static,
{
    Router::new()
        .route("/api/submissions", post(create_submission_handler::<R>))
        .route("/api/submissions/latest", get(latest_submission_handler::<R>))
        .route("/api/submissions/:submission_id", get(submission_handler::<R>))
        .route("/api/process", post(process_handler::<R>))
        .route("/api/results/:submission_id", get(results_handler::<R>))
        .route("/api/leaderboard", get(leaderboard_handler::<R>))
        .route("/api/properties", get(properties_handler::<R>))
        .route("/api/properties/:identifier", get(property_handler::<R>))
        .route("/api/triage/send-emails", post(send_emails_handler::<R>))
        .route("/api/triage/send-letter", post(send_letter_handler::<R>))
        .route("/api/triage/tiers", get(tiers_handler::<R>))
        .route(
            "/api/triage/property/:submission_id",
            get(triage_property_handler::<R>),
        )
        .with_state(service)
}

fn error_response(err: TriageServiceError) -> Response {
    match err {
        TriageServiceError::Validation(overlap) => {
            let payload = json!({
                "error": overlap.to_string(),
                "overlap": overlap.0,
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        TriageServiceError::SubmissionNotFound(id) => {
            let payload = json!({
                "error": "submission not found",
                "submission_id": id,
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        TriageServiceError::PropertyNotFound(identifier) => {
            let payload = json!({
                "error": "property not found",
                "identifier": identifier,
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        TriageServiceError::Repository(err) => {
            error!(error = %err, "triage store failure");
            let payload = json!({
                "error": err.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

fn ok<T: serde::Serialize>(value: T) -> Response {
    (StatusCode::OK, axum::Json(value)).into_response()
}

pub(crate) async fn create_submission_handler<R>(
    State(service): State<Arc<TriageService<R>>>,
    axum::Json(submission): axum::Json<NewSubmission>,
) -> Response
where
    R: TriageRepository + 'static,
{
    match service.create_submission(submission).await {
        Ok(created) => ok(created),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn latest_submission_handler<R>(
    State(service): State<Arc<TriageService<R>>>,
) -> Response
where
    R: TriageRepository + 'static,
{
    match service.latest_submission().await {
        Ok(latest) => ok(latest),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn submission_handler<R>(
    State(service): State<Arc<TriageService<R>>>,
    Path(submission_id): Path<i64>,
) -> Response
where
    R: TriageRepository + 'static,
{
    match service.submission(SubmissionId(submission_id)).await {
        Ok(submission) => ok(submission),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn process_handler<R>(
    State(service): State<Arc<TriageService<R>>>,
    axum::Json(request): axum::Json<ProcessRequest>,
) -> Response
where
    R: TriageRepository + 'static,
{
    match service.process(request.submission_id).await {
        Ok(summary) => ok(summary),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn results_handler<R>(
    State(service): State<Arc<TriageService<R>>>,
    Path(submission_id): Path<i64>,
) -> Response
where
    R: TriageRepository + 'static,
{
    match service.results(SubmissionId(submission_id)).await {
        Ok(view) => ok(view),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn leaderboard_handler<R>(
    State(service): State<Arc<TriageService<R>>>,
) -> Response
where
    R: TriageRepository + 'static,
{
    match service.leaderboard().await {
        Ok(entries) => ok(entries),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn properties_handler<R>(
    State(service): State<Arc<TriageService<R>>>,
) -> Response
where
    R: TriageRepository + 'static,
{
    ok(service.properties())
}

pub(crate) async fn property_handler<R>(
    State(service): State<Arc<TriageService<R>>>,
    Path(identifier): Path<String>,
) -> Response
where
    R: TriageRepository + 'static,
{
    match service.property(&identifier) {
        Ok(property) => ok(property),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn send_emails_handler<R>(
    State(service): State<Arc<TriageService<R>>>,
) -> Response
where
    R: TriageRepository + 'static,
{
    ok(service.send_digests().await)
}

pub(crate) async fn send_letter_handler<R>(
    State(service): State<Arc<TriageService<R>>>,
    axum::Json(request): axum::Json<LetterRequest>,
) -> Response
where
    R: TriageRepository + 'static,
{
    match service
        .send_letter(request.kind, &request.submission_id, request.broker_email)
        .await
    {
        Ok(report) => ok(report),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn tiers_handler<R>(State(service): State<Arc<TriageService<R>>>) -> Response
where
    R: TriageRepository + 'static,
{
    let groups = service.tiers();
    let payload = json!({
        "tiers": groups,
        "counts": tier_counts(&groups),
    });
    ok(payload)
}

pub(crate) async fn triage_property_handler<R>(
    State(service): State<Arc<TriageService<R>>>,
    Path(submission_id): Path<String>,
) -> Response
where
    R: TriageRepository + 'static,
{
    match service.triage_property(&submission_id) {
        Ok(property) => ok(property),
        Err(err) => error_response(err),
    }
}
