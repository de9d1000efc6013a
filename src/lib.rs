//! Clone-retrieval evaluation engine.
//!
//! Draws reproducible evaluation samples from a snippet corpus, looks up
//! their ground-truth clones, ranks each query's similarity scores under a
//! filter policy and reports Precision@K, MRR and MAP.

pub mod config;
pub mod error;
pub mod corpus;
pub mod ground_truth;
pub mod sampling;
pub mod scores;
pub mod eval;
pub mod session;

pub use config::Config;
pub use corpus::{Corpus, FileId};
pub use error::{CloneEvalError, InputStatus, Result};
pub use eval::{Evaluation, EvaluationReport, EvaluationSummary, FilterPolicy};
pub use ground_truth::GroundTruthIndex;
pub use scores::{ScoreMatrix, ScoreRow};
pub use session::EvalSession;
