//! Alignment scoring between an underwriter's triage choices and the model's propensity tiers.
//!
//! | selection   | High | Mid | Low |
//! |-------------|------|-----|-----|
//! | prioritized | 1.0  | 0.5 | 0.0 |
//! | discarded   | 0.0  | 0.5 | 1.0 |
//! | none        | 0.0  | 0.0 | 0.0 |

use serde::{Deserialize, Serialize};

use super::domain::UserSelection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PropensityTier {
    High,
    Mid,
    Low,
}

impl PropensityTier {
    /// Case-insensitive substring match on a propensity label such as "High Propensity".
    pub fn from_label(label: &str) -> Self {
        let label = label.to_ascii_lowercase();
        if label.contains("high") {
            Self::High
        } else if label.contains("mid") || label.contains("medium") {
            Self::Mid
        } else {
            Self::Low
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            PropensityTier::High => "High",
            PropensityTier::Mid => "Mid",
            PropensityTier::Low => "Low",
        }
    }

    pub const fn all() -> [Self; 3] {
        [Self::High, Self::Mid, Self::Low]
    }
}

pub fn selection_points(tier: PropensityTier, selection: Option<UserSelection>) -> f64 {
    match (selection, tier) {
        (Some(UserSelection::Prioritized), PropensityTier::High) => 1.0,
        (Some(UserSelection::Discarded), PropensityTier::Low) => 1.0,
        (Some(_), PropensityTier::Mid) => 0.5,
        _ => 0.0,
    }
}

/// Sum of per-row points; lies in `[0, rows]`.
pub fn compute_points<I>(rows: I) -> f64
where
    I: IntoIterator<Item = (PropensityTier, Option<UserSelection>)>,
{
    rows.into_iter()
        .map(|(tier, selection)| selection_points(tier, selection))
        .sum()
}

/// `points / total * 100`, rounded half away from zero to one decimal place.
pub fn score_percentage(points: f64, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_tenths(points / total as f64 * 100.0)
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlignmentScore {
    pub points: f64,
    pub total: usize,
    pub percentage: f64,
}

impl AlignmentScore {
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (PropensityTier, Option<UserSelection>)>,
    {
        let rows: Vec<_> = rows.into_iter().collect();
        let total = rows.len();
        let points = compute_points(rows);
        Self {
            points,
            total,
            percentage: score_percentage(points, total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PropensityTier::{High, Low, Mid};
    use UserSelection::{Discarded, Prioritized};

    #[test]
    fn tier_labels_match_by_substring() {
        assert_eq!(PropensityTier::from_label("High Propensity"), High);
        assert_eq!(PropensityTier::from_label("HIGH"), High);
        assert_eq!(PropensityTier::from_label("Mid Propensity"), Mid);
        assert_eq!(PropensityTier::from_label("medium"), Mid);
        assert_eq!(PropensityTier::from_label("Low Propensity"), Low);
        assert_eq!(PropensityTier::from_label(""), Low);
    }

    #[test]
    fn mixed_selection_scores_half() {
        let rows = [
            (High, Some(Prioritized)),
            (Mid, Some(Prioritized)),
            (Low, Some(Prioritized)),
            (Low, Some(Discarded)),
            (Mid, Some(Discarded)),
            (High, Some(Discarded)),
        ];
        let score = AlignmentScore::from_rows(rows);
        assert_eq!(score.points, 3.0);
        assert_eq!(score.percentage, 50.0);
    }

    #[test]
    fn unselected_rows_score_zero() {
        let rows = [High, High, High, Mid, Mid, Low].map(|tier| (tier, None));
        assert_eq!(AlignmentScore::from_rows(rows).percentage, 0.0);
    }

    #[test]
    fn perfect_alignment_scores_hundred() {
        let rows = [
            (High, Some(Prioritized)),
            (High, Some(Prioritized)),
            (High, Some(Prioritized)),
            (Low, Some(Discarded)),
            (Low, Some(Discarded)),
            (Low, Some(Discarded)),
        ];
        assert_eq!(AlignmentScore::from_rows(rows).percentage, 100.0);
    }

    #[test]
    fn percentage_rounds_to_one_decimal() {
        assert_eq!(score_percentage(0.5, 6), 8.3);
        assert_eq!(score_percentage(2.5, 6), 41.7);
        assert_eq!(score_percentage(3.5, 6), 58.3);
        assert_eq!(score_percentage(1.0, 0), 0.0);
    }

    #[test]
    fn every_combination_stays_in_range() {
        let tiers = PropensityTier::all();
        let selections = [None, Some(Prioritized), Some(Discarded)];
        for tier in tiers {
            for selection in selections {
                let points = selection_points(tier, selection);
                assert!((0.0..=1.0).contains(&points));
            }
        }
        let worst = [(High, Some(Discarded)); 6];
        let best = [(Low, Some(Discarded)); 6];
        assert_eq!(AlignmentScore::from_rows(worst).percentage, 0.0);
        assert_eq!(AlignmentScore::from_rows(best).percentage, 100.0);
    }
}
