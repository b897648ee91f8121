//! Submission intake, mock processing, result assembly, alignment scoring, and the leaderboard.

pub mod domain;
pub mod pipeline;
pub mod predictions;
pub mod repository;
pub mod results;
pub mod router;
pub mod scoring;
pub mod service;
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use domain::{NewSubmission, SelectionOverlap, Submission, SubmissionId, UserSelection};
pub use pipeline::{InferenceModel, PipelineFailure, PredictionOutcome, PredictionPipeline};
pub use repository::{LeaderboardRow, ProcessResultRecord, RepositoryError, TriageRepository};
pub use results::{PredictionSource, PropertyResult, ResultAssembler, ResultsView, SelectionResolver};
pub use router::triage_router;
pub use scoring::{AlignmentScore, PropensityTier};
pub use service::{
    LeaderboardEntry, ProcessSummary, TriageService, TriageServiceError, TriagedProperty,
};
pub use sqlite::SqliteTriageStore;
