//! Evaluation metrics: Precision@K, reciprocal rank and average precision,
//! plus the means taken over a query set.
//!
//! The means do not share a denominator. Precision@K is averaged over every
//! query, including those that scored zero. MRR and MAP are averaged only over
//! queries whose own score is strictly positive, so a query with no relevant
//! hit changes neither their sum nor their count. Published results for this
//! benchmark use exactly these conventions.

use std::collections::HashSet;

use super::filter::RankedCandidate;
use crate::corpus::FileId;

fn relevant_set(ground_truth: &[FileId]) -> HashSet<&FileId> {
    ground_truth.iter().collect()
}

/// Precision at K: relevant hits among the first `min(k, len)` entries,
/// divided by the number of entries examined. Returns 0.0 when nothing is
/// examined (empty list or `k == 0`).
pub fn precision_at_k(ground_truth: &[FileId], ranked: &[RankedCandidate], k: usize) -> f64 {
    let examined = k.min(ranked.len());
    if examined == 0 {
        return 0.0;
    }
    let relevant = relevant_set(ground_truth);
    let hits = ranked[..examined]
        .iter()
        .filter(|c| relevant.contains(&c.id))
        .count();
    hits as f64 / examined as f64
}

/// Reciprocal of the 1-based rank of the first relevant entry; 0.0 if none.
pub fn reciprocal_rank(ground_truth: &[FileId], ranked: &[RankedCandidate]) -> f64 {
    let relevant = relevant_set(ground_truth);
    ranked
        .iter()
        .position(|c| relevant.contains(&c.id))
        .map(|rank| 1.0 / (rank + 1) as f64)
        .unwrap_or(0.0)
}

/// Average precision: sum of precision at each relevant rank, divided by the
/// size of the ground truth. 0.0 when no relevant entry is retrieved, which
/// also covers an empty ground truth.
pub fn average_precision(ground_truth: &[FileId], ranked: &[RankedCandidate]) -> f64 {
    let relevant = relevant_set(ground_truth);
    let mut hits = 0usize;
    let mut sum = 0.0;
    for (rank, candidate) in ranked.iter().enumerate() {
        if relevant.contains(&candidate.id) {
            hits += 1;
            sum += hits as f64 / (rank + 1) as f64;
        }
    }
    if hits == 0 {
        return 0.0;
    }
    sum / ground_truth.len() as f64
}

/// Which queries a mean is taken over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denominator {
    /// Every query counts.
    AllQueries,
    /// Only queries with a score > 0 count.
    PositiveOnly,
}

/// Running mean of per-query scores.
#[derive(Debug, Clone, Copy)]
pub struct MetricMean {
    denominator: Denominator,
    sum: f64,
    count: usize,
}

impl MetricMean {
    pub fn new(denominator: Denominator) -> Self {
        MetricMean {
            denominator,
            sum: 0.0,
            count: 0,
        }
    }

    pub fn add(&mut self, value: f64) {
        match self.denominator {
            Denominator::AllQueries => {}
            Denominator::PositiveOnly if value > 0.0 => {}
            Denominator::PositiveOnly => return,
        }
        self.sum += value;
        self.count += 1;
    }

    /// Mean of the counted values; 0.0 when nothing was counted.
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    /// Number of queries that entered the mean.
    pub fn count(&self) -> usize {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(ids: &[&str]) -> Vec<RankedCandidate> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| RankedCandidate {
                id: FileId::new(*id),
                score: 1.0 - i as f64 * 0.1,
            })
            .collect()
    }

    fn gt(ids: &[&str]) -> Vec<FileId> {
        ids.iter().map(|s| FileId::new(*s)).collect()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_threshold_scenario() {
        // row {a:0.9, b:0.8, c:0.3}, truth {b}, Threshold(0.5) -> [a, b]
        let list = ranked(&["a", "b"]);
        let truth = gt(&["b"]);
        assert!(close(precision_at_k(&truth, &list, 2), 0.5));
        assert!(close(reciprocal_rank(&truth, &list), 0.5));
        assert!(close(average_precision(&truth, &list), 0.5));
    }

    #[test]
    fn test_precision_examines_fewer_when_list_is_short() {
        let list = ranked(&["a", "b"]);
        let truth = gt(&["a"]);
        // Only 2 entries examined, not 10
        assert!(close(precision_at_k(&truth, &list, 10), 0.5));
    }

    #[test]
    fn test_precision_partial() {
        let list = ranked(&["a", "x", "b", "y", "z"]);
        let truth = gt(&["a", "b"]);
        assert!(close(precision_at_k(&truth, &list, 3), 2.0 / 3.0));
        assert!(close(precision_at_k(&truth, &list, 5), 0.4));
    }

    #[test]
    fn test_precision_zero_k() {
        assert_eq!(precision_at_k(&gt(&["a"]), &ranked(&["a"]), 0), 0.0);
    }

    #[test]
    fn test_empty_list_scores_zero() {
        let truth = gt(&["a"]);
        assert_eq!(precision_at_k(&truth, &[], 5), 0.0);
        assert_eq!(reciprocal_rank(&truth, &[]), 0.0);
        assert_eq!(average_precision(&truth, &[]), 0.0);
    }

    #[test]
    fn test_reciprocal_rank_first_hit_only() {
        let truth = gt(&["c", "d"]);
        assert!(close(reciprocal_rank(&truth, &ranked(&["a", "b", "c", "d"])), 1.0 / 3.0));
        assert!(close(reciprocal_rank(&truth, &ranked(&["d"])), 1.0));
        assert_eq!(reciprocal_rank(&truth, &ranked(&["a", "b"])), 0.0);
    }

    #[test]
    fn test_average_precision() {
        // hits at ranks 1 and 3: (1/1 + 2/3) / 3 relevant
        let truth = gt(&["a", "c", "missing"]);
        let ap = average_precision(&truth, &ranked(&["a", "b", "c", "d"]));
        assert!(close(ap, (1.0 + 2.0 / 3.0) / 3.0));
    }

    #[test]
    fn test_average_precision_perfect() {
        let truth = gt(&["a", "b"]);
        assert!(close(average_precision(&truth, &ranked(&["a", "b", "c"])), 1.0));
    }

    #[test]
    fn test_average_precision_empty_ground_truth() {
        assert_eq!(average_precision(&[], &ranked(&["a", "b"])), 0.0);
    }

    #[test]
    fn test_bounds() {
        let lists = [ranked(&[]), ranked(&["a"]), ranked(&["x", "a", "b", "y"]), ranked(&["b", "a"])];
        let truths = [gt(&[]), gt(&["a"]), gt(&["a", "b", "c"])];
        for list in &lists {
            for truth in &truths {
                for k in [1, 5, 10] {
                    let p = precision_at_k(truth, list, k);
                    assert!((0.0..=1.0).contains(&p));
                }
                let rr = reciprocal_rank(truth, list);
                assert!(rr == 0.0 || (rr > 0.0 && rr <= 1.0));
                let ap = average_precision(truth, list);
                assert!((0.0..=1.0).contains(&ap));
            }
        }
    }

    fn mean_of(denominator: Denominator, values: &[f64]) -> f64 {
        let mut mean = MetricMean::new(denominator);
        for &v in values {
            mean.add(v);
        }
        mean.mean()
    }

    #[test]
    fn test_precision_mean_counts_zero_queries() {
        assert!(close(mean_of(Denominator::AllQueries, &[1.0, 0.0, 0.5, 0.0]), 0.375));
    }

    #[test]
    fn test_mrr_and_map_skip_zero_queries() {
        assert!(close(mean_of(Denominator::PositiveOnly, &[1.0, 0.0, 0.5, 0.0]), 0.75));
        assert!(close(mean_of(Denominator::PositiveOnly, &[0.0, 0.25, 0.0]), 0.25));
    }

    #[test]
    fn test_means_of_nothing() {
        assert_eq!(mean_of(Denominator::AllQueries, &[]), 0.0);
        assert_eq!(mean_of(Denominator::PositiveOnly, &[0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_metric_mean_counts() {
        let mut all = MetricMean::new(Denominator::AllQueries);
        let mut positive = MetricMean::new(Denominator::PositiveOnly);
        for v in [0.0, 0.5, 1.0] {
            all.add(v);
            positive.add(v);
        }
        assert_eq!(all.count(), 3);
        assert_eq!(positive.count(), 2);
        assert!(close(all.mean(), 0.5));
        assert!(close(positive.mean(), 0.75));
    }
}
