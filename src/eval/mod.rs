//! Evaluation: filter policies, ranking metrics (P@K, MRR, MAP), per-run
//! evaluation and the metrics report.

pub mod filter;
pub mod metrics;
pub mod report;
pub mod run;

pub use filter::{FilterPolicy, RankedCandidate};
pub use metrics::{average_precision, precision_at_k, reciprocal_rank, Denominator, MetricMean};
pub use report::{append_metrics_row, MetricsRow};
pub use run::{summarize, Evaluation, EvaluationReport, EvaluationSummary, QueryEvaluation, PRECISION_CUTOFFS};
