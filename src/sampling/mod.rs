//! Deterministic sampling of evaluation subsets.
//!
//! A run draws a seeded shuffle of the corpus, then scans it for files that
//! have ground-truth clones (and pass an optional stratum) until a quota is
//! met. Samples can be written out, stamped with their sampling parameters,
//! and replayed.

mod persist;
mod rng;
mod sampler;
mod strata;

pub use persist::{read_sample, sample_file_name, write_sample, PersistedSample};
pub use rng::{shuffle, SplitMix64};
pub use sampler::{sample, select_evaluation_subset, SampleSpec};
pub use strata::{
    AnyFile, CloneTypeMembership, ComplexityBucket, ComplexityClass, ComplexityTable,
    LineCountBucket, Stratum, DEFAULT_COMPLEXITY_THRESHOLD,
};
