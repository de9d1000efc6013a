//! One evaluation pass: every ground-truth query against the score matrix.

use super::filter::{FilterPolicy, RankedCandidate};
use super::metrics::{average_precision, precision_at_k, reciprocal_rank, Denominator, MetricMean};
use crate::corpus::FileId;
use crate::ground_truth::GroundTruthIndex;
use crate::scores::{ScoreMatrix, ScoreRow};

/// Cutoffs reported for Precision@K.
pub const PRECISION_CUTOFFS: [usize; 2] = [5, 10];

/// Scores of a single query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryEvaluation {
    pub query: FileId,
    /// Size of the query's ground truth.
    pub relevant: usize,
    /// Length of the filtered ranked list.
    pub retrieved: usize,
    pub precision_at_5: f64,
    pub precision_at_10: f64,
    pub reciprocal_rank: f64,
    pub average_precision: f64,
    /// The score matrix had no row for this query.
    pub missing_row: bool,
    /// The filter broke its own contract; all scores are zero.
    pub invariant_violated: bool,
}

/// Means over a query set, with the number of queries behind each one.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EvaluationSummary {
    pub precision_at_5: f64,
    pub precision_at_10: f64,
    pub mrr: f64,
    pub map: f64,
    pub queries: usize,
    pub mrr_queries: usize,
    pub map_queries: usize,
    pub missing_rows: usize,
    pub invariant_violations: usize,
}

#[derive(Debug, Clone)]
pub struct EvaluationReport {
    pub queries: Vec<QueryEvaluation>,
    pub summary: EvaluationSummary,
    /// Some input of the run could not be read, so zeros in the summary
    /// are not a measurement.
    pub inputs_degraded: bool,
}

/// Pairs a ground truth with a score matrix under one filter policy.
pub struct Evaluation<'a> {
    ground_truth: &'a GroundTruthIndex,
    scores: &'a ScoreMatrix,
    policy: FilterPolicy,
    exclude_self: bool,
}

impl<'a> Evaluation<'a> {
    pub fn new(ground_truth: &'a GroundTruthIndex, scores: &'a ScoreMatrix, policy: FilterPolicy) -> Self {
        Evaluation {
            ground_truth,
            scores,
            policy,
            exclude_self: true,
        }
    }

    /// Whether a query's own entry is dropped from its row before ranking.
    pub fn exclude_self(mut self, exclude: bool) -> Self {
        self.exclude_self = exclude;
        self
    }

    /// Filtered ranked list for `query`. An absent row, or a filter that
    /// breaks its contract, gives an empty list.
    pub fn ranked(&self, query: &FileId) -> (Vec<RankedCandidate>, bool) {
        let empty = ScoreRow::new();
        let row = self.scores.row(query).unwrap_or(&empty);
        let exclude = if self.exclude_self { Some(query) } else { None };
        match self.policy.apply_checked(row, exclude) {
            Ok(ranked) => (ranked, false),
            Err(e) => {
                log::error!("Query {}: {}; scoring it as no evidence", query, e);
                (Vec::new(), true)
            }
        }
    }

    pub fn evaluate_query(&self, query: &FileId, ground_truth: &[FileId]) -> QueryEvaluation {
        let missing_row = self.scores.row(query).is_none();
        let (ranked, invariant_violated) = self.ranked(query);
        QueryEvaluation {
            query: query.clone(),
            relevant: ground_truth.len(),
            retrieved: ranked.len(),
            precision_at_5: precision_at_k(ground_truth, &ranked, PRECISION_CUTOFFS[0]),
            precision_at_10: precision_at_k(ground_truth, &ranked, PRECISION_CUTOFFS[1]),
            reciprocal_rank: reciprocal_rank(ground_truth, &ranked),
            average_precision: average_precision(ground_truth, &ranked),
            missing_row,
            invariant_violated,
        }
    }

    /// Evaluate every query of the ground truth, in id order.
    pub fn run(&self) -> EvaluationReport {
        if self.ground_truth.is_degraded() {
            log::warn!("Evaluating against unavailable ground truth; all metrics will be 0");
        }

        let queries: Vec<QueryEvaluation> = self
            .ground_truth
            .queries()
            .map(|(query, truth)| self.evaluate_query(query, truth))
            .collect();
        let summary = summarize(&queries);

        log::info!(
            "{} over {} queries: P@5 {:.4}, P@10 {:.4}, MRR {:.4} ({} queries), MAP {:.4} ({} queries)",
            self.policy.label(),
            summary.queries,
            summary.precision_at_5,
            summary.precision_at_10,
            summary.mrr,
            summary.mrr_queries,
            summary.map,
            summary.map_queries
        );
        if summary.missing_rows > 0 {
            log::warn!("{} queries had no row in the score matrix", summary.missing_rows);
        }

        EvaluationReport {
            queries,
            summary,
            inputs_degraded: self.ground_truth.is_degraded(),
        }
    }
}

/// Aggregate per-query scores. Order of `queries` does not matter.
pub fn summarize(queries: &[QueryEvaluation]) -> EvaluationSummary {
    let mut p5 = MetricMean::new(Denominator::AllQueries);
    let mut p10 = MetricMean::new(Denominator::AllQueries);
    let mut mrr = MetricMean::new(Denominator::PositiveOnly);
    let mut map = MetricMean::new(Denominator::PositiveOnly);

    for q in queries {
        p5.add(q.precision_at_5);
        p10.add(q.precision_at_10);
        mrr.add(q.reciprocal_rank);
        map.add(q.average_precision);
    }

    EvaluationSummary {
        precision_at_5: p5.mean(),
        precision_at_10: p10.mean(),
        mrr: mrr.mean(),
        map: map.mean(),
        queries: queries.len(),
        mrr_queries: mrr.count(),
        map_queries: map.count(),
        missing_rows: queries.iter().filter(|q| q.missing_row).count(),
        invariant_violations: queries.iter().filter(|q| q.invariant_violated).count(),
    }
}
