use std::sync::Arc;

use super::common::*;
use crate::config::MailConfig;
use crate::workflows::dataset::PropertyDataset;
use crate::workflows::notify::{DispatchStatus, LetterKind, NotificationDispatcher};
use crate::workflows::triage::{
    PredictionSource, PropensityTier, RepositoryError, SubmissionId, TriageService,
    TriageServiceError, UserSelection,
};

#[tokio::test]
async fn overlapping_selection_is_rejected_with_offenders() {
    let (service, repository) = build_service();
    let err = service
        .create_submission(new_submission("Avery", &["X", "SUB-24002"], &["X"]))
        .await
        .expect_err("overlap must fail");

    match err {
        TriageServiceError::Validation(overlap) => assert_eq!(overlap.0, vec!["X".to_string()]),
        other => panic!("unexpected error: {other}"),
    }
    assert!(repository.stored(SubmissionId(1)).is_none());
}

#[tokio::test]
async fn created_submission_echoes_input_without_timestamp() {
    let (service, _) = build_service();
    let created = service
        .create_submission(new_submission("Avery", &["SUB-24001"], &["SUB-24006"]))
        .await
        .expect("created");

    assert_eq!(created.id, SubmissionId(1));
    assert!(created.created_at.is_none());

    let fetched = service.submission(created.id).await.expect("fetched");
    assert!(fetched.created_at.is_some());
    assert_eq!(fetched.prioritized_ids, created.prioritized_ids);
}

#[tokio::test]
async fn strict_lookups_report_missing_submissions() {
    let (service, _) = build_service();
    assert!(matches!(
        service.submission(SubmissionId(3)).await,
        Err(TriageServiceError::SubmissionNotFound(SubmissionId(3)))
    ));
    assert!(matches!(
        service.process(SubmissionId(3)).await,
        Err(TriageServiceError::SubmissionNotFound(_))
    ));
    assert!(service.latest_submission().await.expect("query").is_none());
}

#[tokio::test]
async fn latest_prefers_highest_id_on_equal_timestamps() {
    let (service, _) = build_service();
    for name in ["First", "Second", "Third"] {
        service
            .create_submission(new_submission(name, &[], &[]))
            .await
            .expect("created");
    }

    let latest = service
        .latest_submission()
        .await
        .expect("query")
        .expect("latest exists");
    assert_eq!(latest.underwriter_name, "Third");
}

#[tokio::test]
async fn reprocessing_keeps_one_row_per_property() {
    let (service, repository) = build_service();
    let created = service
        .create_submission(new_submission("Jordan", &[], &[]))
        .await
        .expect("created");

    for _ in 0..2 {
        let summary = service.process(created.id).await.expect("processed");
        assert_eq!(summary.count, 6);
        assert_eq!(summary.status, "completed");
        assert_eq!(summary.process_id, created.id);
    }
    assert_eq!(repository.result_rows(created.id), 6);
}

#[tokio::test]
async fn results_score_and_persist_alignment() {
    let (service, repository) = build_service();
    let created = service
        .create_submission(new_submission(
            "Avery",
            &["SUB-24001", "SUB-24004", "SUB-24006"],
            &["SUB-24002", "SUB-24005", "SUB-24003"],
        ))
        .await
        .expect("created");

    let before = service.results(created.id).await.expect("results");
    assert_eq!(before.prediction_source, PredictionSource::Static);
    assert_eq!(before.score_percentage, 33.3);

    service.process(created.id).await.expect("processed");
    let after = service.results(created.id).await.expect("results");
    assert_eq!(after.prediction_source, PredictionSource::Persisted);
    assert_eq!(after.score_percentage, 33.3);
    assert_eq!(after.results[0].user_selection, Some(UserSelection::Prioritized));
    assert_eq!(after.results[1].user_selection, Some(UserSelection::Discarded));
    assert_eq!(after.results[1].quote_propensity, 0.82);

    let stored = repository.stored(created.id).expect("stored");
    assert_eq!(stored.score, Some(33.3));
}

#[tokio::test]
async fn perfect_alignment_scores_full_marks() {
    let (service, _) = build_service();
    let created = service
        .create_submission(new_submission("Sam", &["A", "B", "C"], &["F"]))
        .await
        .expect("created");

    let view = service.results(created.id).await.expect("results");
    // Mid-tier D and E left untouched earn nothing.
    assert_eq!(view.alignment().points, 4.0);
    assert_eq!(view.score_percentage, 66.7);
}

#[tokio::test]
async fn unknown_submission_degrades_to_demo_results() {
    let (service, repository) = build_service();
    let view = service.results(SubmissionId(77)).await.expect("never errors");

    assert_eq!(view.submission_id, SubmissionId(77));
    assert_eq!(view.underwriter_name, "Demo Underwriter");
    assert_eq!(view.score_percentage, 0.0);
    assert_eq!(view.results.len(), 6);
    assert!(repository.stored(SubmissionId(77)).is_none());
}

#[tokio::test]
async fn leaderboard_ranks_scored_submissions_only() {
    let (service, _) = build_service();
    let selections: [(&str, &[&str], &[&str]); 4] = [
        ("Low", &["F"], &[]),
        ("Top", &["A", "B", "C"], &["F"]),
        ("Unscored", &[], &[]),
        ("Tied", &["A", "B", "C"], &["F"]),
    ];
    for (name, prioritized, discarded) in selections {
        let created = service
            .create_submission(new_submission(name, prioritized, discarded))
            .await
            .expect("created");
        if name != "Unscored" {
            service.results(created.id).await.expect("results");
        }
    }

    let board = service.leaderboard().await.expect("leaderboard");
    let names: Vec<&str> = board.iter().map(|e| e.underwriter_name.as_str()).collect();
    assert_eq!(names, vec!["Top", "Tied", "Low"]);
    let ranks: Vec<usize> = board.iter().map(|e| e.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3]);
}

#[tokio::test]
async fn leaderboard_caps_at_ten() {
    let (service, _) = build_service();
    for index in 0..12 {
        let created = service
            .create_submission(new_submission(&format!("UW {index}"), &["A"], &[]))
            .await
            .expect("created");
        service.results(created.id).await.expect("results");
    }

    let board = service.leaderboard().await.expect("leaderboard");
    assert_eq!(board.len(), 10);
    assert_eq!(board[9].rank, 10);
}

#[tokio::test]
async fn store_failures_surface_as_repository_errors() {
    let service = TriageService::new(
        Arc::new(UnavailableRepository),
        PropertyDataset::static_only(),
        NotificationDispatcher::new(&MailConfig::default(), None),
    );

    let err = service
        .results(SubmissionId(1))
        .await
        .expect_err("store is offline");
    assert!(matches!(
        err,
        TriageServiceError::Repository(RepositoryError::Unavailable(_))
    ));
}

#[tokio::test]
async fn triage_lookup_and_letters_use_live_codes() {
    let (service, _) = build_service();

    let triaged = service.triage_property("SUB-24004").expect("known code");
    assert_eq!(triaged.propensity_tier, PropensityTier::Mid);
    assert_eq!(triaged.propensity_score, 0.4319);

    assert!(matches!(
        service.triage_property("SUB-00000"),
        Err(TriageServiceError::PropertyNotFound(_))
    ));

    let report = service
        .send_letter(LetterKind::Intent, "SUB-24001", None)
        .await
        .expect("known code");
    assert_eq!(report.status, DispatchStatus::Skipped);

    let digest = service.send_digests().await;
    assert_eq!(digest.status, DispatchStatus::Skipped);
    assert_eq!(digest.tiers.expect("counts")[&PropensityTier::High], 3);
}
