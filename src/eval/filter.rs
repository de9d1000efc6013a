//! Result filter policies: turn a raw score row into a ranked candidate list.
//!
//! Ranking is score descending. Equal scores are ordered by candidate id
//! ascending, so ties rank the same way on every run regardless of how the
//! row's map happens to iterate.

use std::cmp::Ordering;

use serde::Deserialize;

use crate::corpus::FileId;
use crate::error::{CloneEvalError, Result};
use crate::scores::ScoreRow;

/// One ranked candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    pub id: FileId,
    pub score: f64,
}

/// How a query's row is cut down before metrics are computed.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterPolicy {
    /// Best `k` candidates.
    TopK { k: usize },
    /// Every candidate scoring at least `t`.
    Threshold { t: f64 },
    /// Best `k` among candidates scoring at least `t`.
    TopKThreshold { k: usize, t: f64 },
    /// Every candidate.
    NoFilter,
}

impl FilterPolicy {
    /// Rank `row`. See [`FilterPolicy::apply_excluding`].
    pub fn apply(&self, row: &ScoreRow) -> Vec<RankedCandidate> {
        self.apply_excluding(row, None)
    }

    /// Rank `row`, leaving out `exclude` (used to drop a query's own entry).
    pub fn apply_excluding(&self, row: &ScoreRow, exclude: Option<&FileId>) -> Vec<RankedCandidate> {
        let min_score = match *self {
            FilterPolicy::Threshold { t } | FilterPolicy::TopKThreshold { t, .. } => Some(t),
            FilterPolicy::TopK { .. } | FilterPolicy::NoFilter => None,
        };

        let mut ranked: Vec<RankedCandidate> = row
            .iter()
            .filter(|&(id, _)| Some(id) != exclude)
            .filter(|&(_, score)| min_score.map_or(true, |t| *score >= t))
            .map(|(id, &score)| RankedCandidate {
                id: id.clone(),
                score,
            })
            .collect();

        ranked.sort_by(compare_ranked);

        match *self {
            FilterPolicy::TopK { k } | FilterPolicy::TopKThreshold { k, .. } => ranked.truncate(k),
            FilterPolicy::Threshold { .. } | FilterPolicy::NoFilter => {}
        }
        ranked
    }

    /// [`FilterPolicy::apply_excluding`] plus the sanity checks on its output:
    /// never longer than the row, and only ids taken from the row.
    pub fn apply_checked(&self, row: &ScoreRow, exclude: Option<&FileId>) -> Result<Vec<RankedCandidate>> {
        let ranked = self.apply_excluding(row, exclude);
        if ranked.len() > row.len() {
            return Err(CloneEvalError::InvariantViolation(format!(
                "{} returned {} candidates from a row of {}",
                self.label(),
                ranked.len(),
                row.len()
            )));
        }
        if let Some(stray) = ranked.iter().find(|c| !row.contains_key(&c.id)) {
            return Err(CloneEvalError::InvariantViolation(format!(
                "{} returned {} which is not in the row",
                self.label(),
                stray.id
            )));
        }
        Ok(ranked)
    }

    /// Short name used in logs and reports, e.g. `top_k(10)`.
    pub fn label(&self) -> String {
        match *self {
            FilterPolicy::TopK { k } => format!("top_k({})", k),
            FilterPolicy::Threshold { t } => format!("threshold({})", t),
            FilterPolicy::TopKThreshold { k, t } => format!("top_k_threshold({}, {})", k, t),
            FilterPolicy::NoFilter => "no_filter".to_string(),
        }
    }
}

fn compare_ranked(a: &RankedCandidate, b: &RankedCandidate) -> Ordering {
    b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id))
}
