//! Ground truth: clone-pair relation files and the per-file clone index.

mod index;
mod relation;

pub use index::GroundTruthIndex;
pub use relation::{parse_pairs, RelationLayout, RelationPairs};
