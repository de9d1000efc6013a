//! Per-run orchestration shared by the binaries: resolve inputs once from a
//! [`Config`], then draw and evaluate one sample per seed.

use std::path::Path;
use std::time::Instant;

use crate::config::{Config, StratifyConfig};
use crate::corpus::{Corpus, FileId};
use crate::error::{InputStatus, Result};
use crate::eval::{append_metrics_row, Evaluation, EvaluationReport, MetricsRow};
use crate::ground_truth::{GroundTruthIndex, RelationLayout};
use crate::sampling::{
    read_sample, write_sample, AnyFile, CloneTypeMembership, ComplexityBucket, ComplexityTable,
    LineCountBucket, SampleSpec, Stratum,
};
use crate::scores::ScoreMatrix;

impl StratifyConfig {
    /// Build the predicate this config describes. Data-backed predicates
    /// degrade (and log) when their input cannot be read.
    pub fn build(&self, layout: &RelationLayout, scope: &Corpus) -> Box<dyn Stratum> {
        match self {
            StratifyConfig::None => Box::new(AnyFile),
            StratifyConfig::CloneType { path } => {
                let index = GroundTruthIndex::build(path, layout, scope);
                Box::new(CloneTypeMembership::from_index(&index))
            }
            StratifyConfig::Complexity { table, bucket, threshold } => Box::new(ComplexityBucket {
                table: ComplexityTable::load(table),
                class: *bucket,
                threshold: *threshold,
            }),
            StratifyConfig::LineCount { min, max } => Box::new(LineCountBucket { min: *min, max: *max }),
        }
    }
}

/// Resolved inputs of one functionality bucket.
pub struct EvalSession {
    pub config: Config,
    pub corpus: Corpus,
    pub ground_truth: GroundTruthIndex,
    stratum: Box<dyn Stratum>,
}

impl EvalSession {
    pub fn open(config: Config) -> Self {
        let corpus = Corpus::discover(&config.corpus_dir(), &config.corpus.extension);
        let ground_truth =
            GroundTruthIndex::build(&config.ground_truth.path, &config.ground_truth.layout, &corpus);
        let stratum = config.sampling.stratify.build(&config.ground_truth.layout, &corpus);
        EvalSession {
            config,
            corpus,
            ground_truth,
            stratum,
        }
    }

    /// Input statuses worth reporting, labelled.
    pub fn input_statuses(&self) -> Vec<(&'static str, &InputStatus)> {
        let mut statuses = vec![
            ("corpus", self.corpus.status()),
            ("ground truth", self.ground_truth.status()),
        ];
        if let Some(status) = self.stratum.status() {
            statuses.push(("stratum", status));
        }
        statuses
    }

    pub fn inputs_degraded(&self) -> bool {
        self.input_statuses().iter().any(|(_, status)| status.is_degraded())
    }

    /// One-line description of every parameter that shapes a drawn sample,
    /// written at the top of persisted sample files.
    pub fn sample_stamp(&self) -> String {
        let sampling = &self.config.sampling;
        format!(
            "corpus={:?} extension={:?} ground_truth={:?} layout={:?} initial_size={} quota={} stratify={:?}",
            self.config.corpus_dir(),
            self.config.corpus.extension,
            self.config.ground_truth.path,
            self.config.ground_truth.layout,
            sampling.initial_size,
            sampling.quota,
            sampling.stratify
        )
    }

    pub fn stratum(&self) -> &dyn Stratum {
        self.stratum.as_ref()
    }

    /// Evaluation subset for `seed`, drawn fresh.
    pub fn draw(&self, seed: u64) -> Vec<FileId> {
        SampleSpec::new(seed, self.config.sampling.initial_size, self.config.sampling.quota)
            .with_stratum(self.stratum.as_ref())
            .draw(self.corpus.ids(), &self.ground_truth)
    }

    /// Draw the subset for `seed` and persist it. A sample drawn while an
    /// input is unavailable is returned but not written.
    pub fn draw_and_persist(&self, seed: u64) -> Result<Vec<FileId>> {
        let sample = self.draw(seed);
        if self.inputs_degraded() {
            log::warn!(
                "Not persisting sample for seed {}: drawn with unavailable inputs",
                seed
            );
            return Ok(sample);
        }
        write_sample(&self.config.sample_path(seed), &sample, &self.corpus, &self.sample_stamp())?;
        Ok(sample)
    }

    /// Persisted subset for `seed` when it was drawn with the current
    /// sampling parameters, otherwise a fresh draw (which is then persisted).
    pub fn sample_for(&self, seed: u64) -> Result<Vec<FileId>> {
        let path = self.config.sample_path(seed);
        if path.is_file() {
            let persisted = read_sample(&path)?;
            if persisted.stamp.as_deref() == Some(self.sample_stamp().as_str()) {
                log::info!("Replaying sample {}", path.display());
                return Ok(persisted.ids);
            }
            log::warn!(
                "Sample {} was drawn with different sampling parameters; drawing it again",
                path.display()
            );
        }
        self.draw_and_persist(seed)
    }

    /// Evaluate `sample` against the score matrix of `seed`.
    pub fn evaluate(&self, seed: u64, sample: &[FileId]) -> Result<(EvaluationReport, MetricsRow)> {
        let started = Instant::now();
        let scores = ScoreMatrix::load(&self.config.scores_path(seed))?;
        let ground_truth = self.ground_truth.restrict(sample);
        let mut report = Evaluation::new(&ground_truth, &scores, self.config.evaluation.filter)
            .exclude_self(self.config.evaluation.exclude_self)
            .run();
        report.inputs_degraded |= self.inputs_degraded();
        let row = MetricsRow::from_summary(
            &report.summary,
            &self.config.evaluation.technique,
            &self.config.corpus.functionality,
            started.elapsed().as_secs_f64(),
            seed,
        );
        Ok((report, row))
    }

    /// Evaluate one seed end to end and append its metrics row.
    pub fn run_seed(&self, seed: u64) -> Result<(EvaluationReport, MetricsRow)> {
        let sample = self.sample_for(seed)?;
        let (report, row) = self.evaluate(seed, &sample)?;
        append_metrics_row(&self.config.output.metrics_csv, &row)?;
        Ok((report, row))
    }

    pub fn metrics_path(&self) -> &Path {
        &self.config.output.metrics_csv
    }
}
