//! Append-only metrics file: one CSV row per evaluation run.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use super::run::EvaluationSummary;
use crate::error::Result;

/// `precision@5,precision@10,MRR,MAP,technique,functionality,elapsed_secs,seed`
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsRow {
    pub precision_at_5: f64,
    pub precision_at_10: f64,
    pub mrr: f64,
    pub map: f64,
    pub technique: String,
    pub functionality: String,
    pub elapsed_secs: f64,
    pub seed: u64,
}

impl MetricsRow {
    pub fn from_summary(
        summary: &EvaluationSummary,
        technique: &str,
        functionality: &str,
        elapsed_secs: f64,
        seed: u64,
    ) -> Self {
        MetricsRow {
            precision_at_5: summary.precision_at_5,
            precision_at_10: summary.precision_at_10,
            mrr: summary.mrr,
            map: summary.map,
            technique: technique.to_string(),
            functionality: functionality.to_string(),
            elapsed_secs,
            seed,
        }
    }

    pub fn to_csv_line(&self) -> String {
        format!(
            "{},{},{},{},{},{},{:.3},{}",
            self.precision_at_5,
            self.precision_at_10,
            self.mrr,
            self.map,
            csv_field(&self.technique),
            csv_field(&self.functionality),
            self.elapsed_secs,
            self.seed
        )
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Append `row` to `path`, creating the file and its directories if needed.
/// Existing rows are never rewritten.
pub fn append_metrics_row(path: &Path, row: &MetricsRow) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", row.to_csv_line())?;
    log::debug!("Appended metrics for seed {} to {}", row.seed, path.display());
    Ok(())
}
