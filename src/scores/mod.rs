//! Sparse query -> candidate -> score matrix produced by a similarity engine.
//!
//! The matrix is read-only input to evaluation. Two on-disk forms are
//! accepted: a JSON object of objects (`{"q": {"c": 0.9}}`) for files ending
//! in `.json`, and delimited `query,candidate,score` triples (comma or tab)
//! for anything else.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::corpus::FileId;
use crate::error::{CloneEvalError, Result};

/// Scores of every candidate for one query.
pub type ScoreRow = HashMap<FileId, f64>;

#[derive(Debug, Clone, Default)]
pub struct ScoreMatrix {
    rows: HashMap<FileId, ScoreRow>,
}

impl ScoreMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a matrix from disk. A missing or malformed file is an error: the
    /// similarity engine is expected to have finished before evaluation.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| CloneEvalError::InputUnavailable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        let matrix = if is_json {
            Self::from_json(&content)?
        } else {
            Self::from_triples(&content)?
        };
        log::info!(
            "Loaded score matrix {}: {} queries, {} scores",
            path.display(),
            matrix.len(),
            matrix.score_count()
        );
        Ok(matrix)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let raw: HashMap<String, HashMap<String, f64>> = serde_json::from_str(content)
            .map_err(|e| CloneEvalError::Parse(format!("Invalid score matrix JSON: {}", e)))?;
        let mut matrix = ScoreMatrix::new();
        for (query, row) in raw {
            let query = FileId::from_file_name(&query);
            // Queries with an empty row still count as present
            matrix.rows.entry(query.clone()).or_default();
            for (candidate, score) in row {
                matrix.insert(query.clone(), FileId::from_file_name(&candidate), score)?;
            }
        }
        Ok(matrix)
    }

    /// Parse `query,candidate,score` lines. A first line whose score does not
    /// parse is treated as a header.
    pub fn from_triples(content: &str) -> Result<Self> {
        let mut matrix = ScoreMatrix::new();
        let mut first = true;
        for (line_no, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let is_first = std::mem::replace(&mut first, false);
            let fields: Vec<&str> = trimmed
                .split([',', '\t'])
                .map(str::trim)
                .collect();
            if fields.len() < 3 {
                return Err(CloneEvalError::Parse(format!(
                    "Score line {}: expected query,candidate,score",
                    line_no + 1
                )));
            }
            let score = match fields[2].parse::<f64>() {
                Ok(s) => s,
                Err(_) if is_first => continue,
                Err(_) => {
                    return Err(CloneEvalError::Parse(format!(
                        "Score line {}: bad score {:?}",
                        line_no + 1,
                        fields[2]
                    )))
                }
            };
            matrix.insert(
                FileId::from_file_name(fields[0]),
                FileId::from_file_name(fields[1]),
                score,
            )?;
        }
        Ok(matrix)
    }

    /// Set one score. Non-finite scores are rejected since they cannot be ranked.
    pub fn insert(&mut self, query: FileId, candidate: FileId, score: f64) -> Result<()> {
        if !score.is_finite() {
            return Err(CloneEvalError::InvalidInput(format!(
                "Non-finite score {} for {} -> {}",
                score, query, candidate
            )));
        }
        self.rows.entry(query).or_default().insert(candidate, score);
        Ok(())
    }

    /// Row for `query`, if the engine produced one.
    pub fn row(&self, query: &FileId) -> Option<&ScoreRow> {
        self.rows.get(query)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn score_count(&self) -> usize {
        self.rows.values().map(HashMap::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn id(s: &str) -> FileId {
        FileId::new(s)
    }

    #[test]
    fn test_from_json() {
        let matrix = ScoreMatrix::from_json(r#"{"a.java": {"b.java": 0.9, "c": 0.1}, "d": {}}"#).unwrap();
        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix.score_count(), 2);
        let row = matrix.row(&id("a")).unwrap();
        assert_eq!(row.get(&id("b")), Some(&0.9));
        assert!(matrix.row(&id("d")).unwrap().is_empty());
        assert!(matrix.row(&id("zzz")).is_none());
    }

    #[test]
    fn test_from_triples_with_header() {
        let content = "query,candidate,score\na,b,0.5\na\tc\t0.25\n\n# done\nb,a,1\n";
        let matrix = ScoreMatrix::from_triples(content).unwrap();
        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix.row(&id("a")).unwrap().len(), 2);
        assert_eq!(matrix.row(&id("b")).unwrap().get(&id("a")), Some(&1.0));
    }

    #[test]
    fn test_from_triples_rejects_bad_rows() {
        assert!(ScoreMatrix::from_triples("a,b,0.5\na,c,high\n").is_err());
        assert!(ScoreMatrix::from_triples("a,b\n").is_err());
        assert!(ScoreMatrix::from_triples("a,b,NaN\n").is_err());
    }

    #[test]
    fn test_load_by_extension() {
        let temp_dir = TempDir::new().unwrap();
        let json = temp_dir.path().join("scores.json");
        fs::write(&json, r#"{"q": {"c": 0.3}}"#).unwrap();
        let csv = temp_dir.path().join("scores.csv");
        fs::write(&csv, "q,c,0.3\n").unwrap();
        assert_eq!(ScoreMatrix::load(&json).unwrap().score_count(), 1);
        assert_eq!(ScoreMatrix::load(&csv).unwrap().score_count(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = ScoreMatrix::load(&temp_dir.path().join("none.json")).unwrap_err();
        assert!(matches!(err, CloneEvalError::InputUnavailable { .. }));
    }
}
