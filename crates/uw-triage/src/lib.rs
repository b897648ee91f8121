//! Underwriting triage backend.
//!
//! Underwriters review six synthetic property submissions, prioritize or discard them, trigger a
//! mock risk-scoring pass, and receive an alignment score comparing their choices against the
//! model's propensity tiers.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
