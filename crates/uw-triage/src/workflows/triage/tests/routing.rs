use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::config::MailConfig;
use crate::workflows::dataset::PropertyDataset;
use crate::workflows::notify::NotificationDispatcher;
use crate::workflows::triage::router::results_handler;
use crate::workflows::triage::TriageService;

fn post_json(uri: &str, payload: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request builds")
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request builds")
}

#[tokio::test]
async fn overlap_returns_bad_request_with_offenders() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/submissions",
            json!({
                "underwriter_name": "Avery",
                "prioritized_ids": ["X", "Y"],
                "discarded_ids": ["Y", "X"],
            }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert_eq!(body["overlap"], json!(["X", "Y"]));
}

#[tokio::test]
async fn full_flow_through_the_router() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(post_json(
            "/api/submissions",
            json!({
                "underwriter_name": "Jordan",
                "prioritized_ids": ["SUB-24001", "SUB-24002"],
                "discarded_ids": ["SUB-24006"],
            }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let created = read_json_body(response).await;
    assert_eq!(created["id"], json!(1));
    assert_eq!(created["created_at"], Value::Null);

    let response = router
        .clone()
        .oneshot(post_json("/api/process", json!({ "submissionId": 1 })))
        .await
        .expect("router responds");
    let processed = read_json_body(response).await;
    assert_eq!(processed, json!({ "processId": 1, "status": "completed", "count": 6 }));

    let response = router
        .clone()
        .oneshot(get("/api/results/1"))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let results = read_json_body(response).await;
    assert_eq!(results["score_percentage"], json!(50.0));
    assert_eq!(results["prediction_source"], json!("persisted"));
    assert_eq!(results["results"][5]["user_selection"], json!("discarded"));
    assert_eq!(results["results"][3]["user_selection"], Value::Null);

    let response = router
        .oneshot(get("/api/leaderboard"))
        .await
        .expect("router responds");
    let board = read_json_body(response).await;
    assert_eq!(board[0]["rank"], json!(1));
    assert_eq!(board[0]["underwriter_name"], json!("Jordan"));
    assert_eq!(board[0]["score_percentage"], json!(50.0));
}

#[tokio::test]
async fn missing_submission_is_not_found_but_results_degrade() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(get("/api/submissions/42"))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = router
        .clone()
        .oneshot(post_json("/api/process", json!({ "submissionId": 42 })))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = router
        .oneshot(get("/api/results/42"))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["underwriter_name"], json!("Demo Underwriter"));
    assert_eq!(body["prediction_source"], json!("static"));
}

#[tokio::test]
async fn latest_is_null_on_empty_store() {
    let (service, _) = build_service();
    let response = router_with_service(service)
        .oneshot(get("/api/submissions/latest"))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json_body(response).await, Value::Null);
}

#[tokio::test]
async fn properties_are_lettered_a_to_f() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(get("/api/properties"))
        .await
        .expect("router responds");
    let body = read_json_body(response).await;
    let letters: Vec<&str> = body
        .as_array()
        .expect("array")
        .iter()
        .map(|p| p["propertyId"].as_str().expect("letter"))
        .collect();
    assert_eq!(letters, vec!["A", "B", "C", "D", "E", "F"]);

    let response = router
        .clone()
        .oneshot(get("/api/properties/d"))
        .await
        .expect("router responds");
    let body = read_json_body(response).await;
    assert_eq!(body["submission_id"], json!("SUB-24004"));

    let response = router
        .oneshot(get("/api/properties/Z"))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn triage_helpers_report_skipped_sends() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(post_json("/api/triage/send-emails", json!({})))
        .await
        .expect("router responds");
    let body = read_json_body(response).await;
    assert_eq!(body["status"], json!("skipped"));
    assert_eq!(body["tiers"], json!({ "High": 3, "Mid": 2, "Low": 1 }));

    let response = router
        .clone()
        .oneshot(post_json(
            "/api/triage/send-letter",
            json!({ "kind": "non_interest", "submission_id": "SUB-24006" }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json_body(response).await["status"], json!("skipped"));

    let response = router
        .clone()
        .oneshot(get("/api/triage/property/SUB-24002"))
        .await
        .expect("router responds");
    let body = read_json_body(response).await;
    assert_eq!(body["propensity_tier"], json!("High"));
    assert_eq!(body["propertyId"], json!("B"));

    let response = router
        .clone()
        .oneshot(get("/api/triage/property/UNKNOWN"))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = router
        .oneshot(get("/api/triage/tiers"))
        .await
        .expect("router responds");
    let body = read_json_body(response).await;
    assert_eq!(body["tiers"]["Low"], json!(["SUB-24006"]));
}

#[tokio::test]
async fn results_handler_maps_store_failure_to_internal_error() {
    let service = Arc::new(TriageService::new(
        Arc::new(UnavailableRepository),
        PropertyDataset::static_only(),
        NotificationDispatcher::new(&MailConfig::default(), None),
    ));

    let response = results_handler::<UnavailableRepository>(State(service), Path(1)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
