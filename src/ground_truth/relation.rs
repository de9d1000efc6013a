//! Column layout of a clone-pair relation file and its row parser.

use std::io::BufRead;

use serde::Deserialize;

use crate::corpus::FileId;
use crate::error::{CloneEvalError, Result};

/// Where the two file ids live in each row of a relation file.
///
/// Each side is a group of columns whose values are joined by `joiner`, so a
/// BigCloneEval style row `name1,start1,end1,name2,start2,end2` maps onto the
/// corpus ids `name1_start1_end1` / `name2_start2_end2` with
/// `left_columns = [0, 1, 2]` and `right_columns = [3, 4, 5]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RelationLayout {
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    #[serde(default)]
    pub has_header: bool,
    #[serde(default = "default_left_columns")]
    pub left_columns: Vec<usize>,
    #[serde(default = "default_right_columns")]
    pub right_columns: Vec<usize>,
    #[serde(default = "default_joiner")]
    pub joiner: String,
}

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_left_columns() -> Vec<usize> {
    vec![0]
}

fn default_right_columns() -> Vec<usize> {
    vec![1]
}

fn default_joiner() -> String {
    "_".to_string()
}

impl Default for RelationLayout {
    fn default() -> Self {
        RelationLayout {
            delimiter: default_delimiter(),
            has_header: false,
            left_columns: default_left_columns(),
            right_columns: default_right_columns(),
            joiner: default_joiner(),
        }
    }
}

impl RelationLayout {
    pub fn validate(&self) -> Result<()> {
        if self.delimiter.is_empty() {
            return Err(CloneEvalError::Config("relation delimiter must not be empty".to_string()));
        }
        if self.left_columns.is_empty() || self.right_columns.is_empty() {
            return Err(CloneEvalError::Config(
                "relation left_columns and right_columns must name at least one column".to_string(),
            ));
        }
        Ok(())
    }

    fn width(&self) -> usize {
        self.left_columns
            .iter()
            .chain(self.right_columns.iter())
            .max()
            .map(|m| m + 1)
            .unwrap_or(0)
    }

    fn join(&self, fields: &[&str], columns: &[usize]) -> FileId {
        let parts: Vec<&str> = columns.iter().map(|&c| fields[c]).collect();
        FileId::from_file_name(&parts.join(self.joiner.as_str()))
    }
}

/// Pairs read from a relation file, plus the number of rows that were skipped.
#[derive(Debug, Default)]
pub struct RelationPairs {
    pub pairs: Vec<(FileId, FileId)>,
    pub skipped_rows: usize,
}

/// Read `(id1, id2)` pairs row by row.
///
/// Blank lines and `#` comments are ignored. Rows with fewer columns than the
/// layout needs, with an empty id column, or that are not valid UTF-8 are
/// skipped and counted. Only a failing read is an error.
pub fn parse_pairs<R: BufRead>(reader: R, layout: &RelationLayout) -> Result<RelationPairs> {
    layout.validate()?;
    let width = layout.width();
    let mut out = RelationPairs::default();
    let mut header_pending = layout.has_header;

    for (line_no, raw) in reader.split(b'\n').enumerate() {
        let line = match String::from_utf8(raw?) {
            Ok(l) => l,
            Err(e) => {
                log::debug!("Relation row {} is not valid UTF-8: {}", line_no + 1, e);
                out.skipped_rows += 1;
                continue;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if header_pending {
            header_pending = false;
            continue;
        }
        let fields: Vec<&str> = trimmed.split(layout.delimiter.as_str()).map(str::trim).collect();
        if fields.len() < width {
            log::debug!("Relation row {} has {} columns, need {}", line_no + 1, fields.len(), width);
            out.skipped_rows += 1;
            continue;
        }
        let mut used = layout.left_columns.iter().chain(layout.right_columns.iter());
        if used.any(|&c| fields[c].is_empty()) {
            log::debug!("Relation row {} has an empty id column", line_no + 1);
            out.skipped_rows += 1;
            continue;
        }
        out.pairs.push((
            layout.join(&fields, &layout.left_columns),
            layout.join(&fields, &layout.right_columns),
        ));
    }

    Ok(out)
}
