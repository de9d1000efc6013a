use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::eval::FilterPolicy;
use crate::ground_truth::RelationLayout;
use crate::sampling::{ComplexityClass, DEFAULT_COMPLEXITY_THRESHOLD};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub corpus: CorpusConfig,
    pub ground_truth: GroundTruthConfig,
    pub sampling: SamplingConfig,
    pub evaluation: EvaluationConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where the snippets of one functionality bucket live
#[derive(Debug, Clone, Deserialize)]
pub struct CorpusConfig {
    /// Dataset root, e.g. `data/BigCloneEval/ijadataset/bcb_reduced`
    pub root: PathBuf,
    /// Functionality bucket (sub-directory of `root`)
    pub functionality: String,
    /// Optional extra level below the bucket, e.g. `selected`
    #[serde(default)]
    pub subdirectory: Option<String>,
    #[serde(default = "default_extension")]
    pub extension: String,
}

/// Clone-pair relation file and its column layout
#[derive(Debug, Clone, Deserialize)]
pub struct GroundTruthConfig {
    pub path: PathBuf,
    #[serde(flatten)]
    pub layout: RelationLayout,
}

/// Seeded sampling configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SamplingConfig {
    pub seeds: Vec<u64>,
    /// Size of the initial shuffled draw
    pub initial_size: usize,
    /// Number of files with ground truth to select from that draw
    pub quota: usize,
    #[serde(default)]
    pub stratify: StratifyConfig,
}

/// Stratification predicate applied while selecting the evaluation subset
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StratifyConfig {
    #[default]
    None,
    /// Files with at least one pair in another clone-type relation file
    /// (read with the ground-truth layout)
    CloneType { path: PathBuf },
    /// Complexity bucket, falling back to line count for unlisted files
    Complexity {
        table: PathBuf,
        bucket: ComplexityClass,
        #[serde(default = "default_complexity_threshold")]
        threshold: u32,
    },
    /// Line-count range from the `_start_end` id suffix (inclusive)
    LineCount { min: u32, max: u32 },
}

/// Evaluation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationConfig {
    /// Label written to the metrics file, e.g. `tfidf`
    pub technique: String,
    /// Score matrix path; `{seed}` is replaced by the run's seed
    pub scores: String,
    pub filter: FilterPolicy,
    #[serde(default = "default_exclude_self")]
    pub exclude_self: bool,
}

/// Output locations
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_sample_dir")]
    pub sample_dir: PathBuf,
    #[serde(default = "default_metrics_csv")]
    pub metrics_csv: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            sample_dir: default_sample_dir(),
            metrics_csv: default_metrics_csv(),
        }
    }
}

fn default_extension() -> String {
    "java".to_string()
}

fn default_complexity_threshold() -> u32 {
    DEFAULT_COMPLEXITY_THRESHOLD
}

fn default_exclude_self() -> bool {
    true
}

fn default_sample_dir() -> PathBuf {
    PathBuf::from("samples")
}

fn default_metrics_csv() -> PathBuf {
    PathBuf::from("results/metrics.csv")
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in CLONEEVAL_CONFIG environment variable
    /// 2. ./config.toml in current directory
    pub fn load() -> Result<Self> {
        // .env is optional
        let _ = dotenv::dotenv();

        let config_path = std::env::var("CLONEEVAL_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        Self::load_from(&config_path)
    }

    /// Load and validate a specific config file
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.corpus.functionality.trim().is_empty() {
            anyhow::bail!("corpus.functionality must not be empty");
        }

        self.ground_truth
            .layout
            .validate()
            .context("Invalid [ground_truth] layout")?;

        if self.sampling.seeds.is_empty() {
            anyhow::bail!("sampling.seeds must list at least one seed");
        }

        if self.sampling.quota == 0 {
            anyhow::bail!("sampling.quota must be greater than 0");
        }

        if self.sampling.initial_size < self.sampling.quota {
            anyhow::bail!(
                "sampling.initial_size ({}) must be at least sampling.quota ({})",
                self.sampling.initial_size,
                self.sampling.quota
            );
        }

        if let StratifyConfig::LineCount { min, max } = self.sampling.stratify {
            if min > max {
                anyhow::bail!("sampling.stratify line_count min ({}) exceeds max ({})", min, max);
            }
        }

        match self.evaluation.filter {
            FilterPolicy::TopK { k } | FilterPolicy::TopKThreshold { k, .. } if k == 0 => {
                anyhow::bail!("evaluation.filter k must be greater than 0");
            }
            FilterPolicy::Threshold { t } | FilterPolicy::TopKThreshold { t, .. } if !t.is_finite() => {
                anyhow::bail!("evaluation.filter t must be a finite number");
            }
            _ => {}
        }

        if self.evaluation.technique.trim().is_empty() {
            anyhow::bail!("evaluation.technique must not be empty");
        }

        Ok(())
    }

    /// Directory holding the snippets of the configured bucket
    pub fn corpus_dir(&self) -> PathBuf {
        let bucket = self.corpus.root.join(&self.corpus.functionality);
        match &self.corpus.subdirectory {
            Some(sub) => bucket.join(sub),
            None => bucket,
        }
    }

    /// Score matrix path for one seed
    pub fn scores_path(&self, seed: u64) -> PathBuf {
        PathBuf::from(self.evaluation.scores.replace("{seed}", &seed.to_string()))
    }

    /// Where the sample of one seed is persisted
    pub fn sample_path(&self, seed: u64) -> PathBuf {
        self.output
            .sample_dir
            .join(crate::sampling::sample_file_name(&self.corpus.functionality, seed))
    }
}
