use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Store-assigned submission identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(pub i64);

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Payload an underwriter sends when recording triage decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubmission {
    pub underwriter_name: String,
    #[serde(default)]
    pub prioritized_ids: Vec<String>,
    #[serde(default)]
    pub discarded_ids: Vec<String>,
}

impl NewSubmission {
    /// Rejects identifiers that appear in both lists, reporting each once in prioritized order.
    pub fn validate(&self) -> Result<(), SelectionOverlap> {
        let discarded: HashSet<&str> = self.discarded_ids.iter().map(String::as_str).collect();
        let mut overlap: Vec<String> = Vec::new();
        for id in &self.prioritized_ids {
            if discarded.contains(id.as_str()) && !overlap.contains(id) {
                overlap.push(id.clone());
            }
        }

        if overlap.is_empty() {
            Ok(())
        } else {
            Err(SelectionOverlap(overlap))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("property ids cannot be both prioritized and discarded: {}", .0.join(", "))]
pub struct SelectionOverlap(pub Vec<String>);

/// A persisted set of triage decisions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub underwriter_name: String,
    pub prioritized_ids: Vec<String>,
    pub discarded_ids: Vec<String>,
    pub created_at: Option<NaiveDateTime>,
    #[serde(rename = "score_percentage", skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// How an underwriter tagged a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserSelection {
    Prioritized,
    Discarded,
}

impl UserSelection {
    pub const fn label(self) -> &'static str {
        match self {
            UserSelection::Prioritized => "prioritized",
            UserSelection::Discarded => "discarded",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(prioritized: &[&str], discarded: &[&str]) -> NewSubmission {
        NewSubmission {
            underwriter_name: "Riley".to_string(),
            prioritized_ids: prioritized.iter().map(|id| id.to_string()).collect(),
            discarded_ids: discarded.iter().map(|id| id.to_string()).collect(),
        }
    }

    #[test]
    fn disjoint_selections_validate() {
        assert!(submission(&["A", "B"], &["C"]).validate().is_ok());
        assert!(submission(&[], &[]).validate().is_ok());
    }

    #[test]
    fn overlap_lists_each_offender_once() {
        let err = submission(&["X", "Y", "X", "Z"], &["Z", "X"])
            .validate()
            .expect_err("overlap rejected");
        assert_eq!(err.0, vec!["X".to_string(), "Z".to_string()]);
        assert!(err.to_string().ends_with("X, Z"));
    }

    #[test]
    fn selection_serializes_lowercase() {
        let json = serde_json::to_string(&Some(UserSelection::Discarded)).expect("serializes");
        assert_eq!(json, "\"discarded\"");
        let none: Option<UserSelection> = None;
        assert_eq!(serde_json::to_string(&none).expect("serializes"), "null");
    }
}
