//! Stratification predicates for evaluation-subset selection.
//!
//! Each predicate answers one question about a file id; the sampler treats
//! them as opaque. Predicates backed by data files degrade instead of
//! failing: a missing complexity table falls back to line counts, and a
//! file whose id has no `_start_end` suffix is simply not admitted.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Deserialize;

use crate::corpus::FileId;
use crate::error::InputStatus;
use crate::ground_truth::GroundTruthIndex;

/// A yes/no filter over file ids.
pub trait Stratum {
    fn admits(&self, id: &FileId) -> bool;

    /// Short label for logs.
    fn describe(&self) -> String {
        "custom".to_string()
    }

    /// Status of the data behind the predicate, if it reads any.
    fn status(&self) -> Option<&InputStatus> {
        None
    }
}

impl<F> Stratum for F
where
    F: Fn(&FileId) -> bool,
{
    fn admits(&self, id: &FileId) -> bool {
        self(id)
    }
}

/// Admits every file.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyFile;

impl Stratum for AnyFile {
    fn admits(&self, _id: &FileId) -> bool {
        true
    }

    fn describe(&self) -> String {
        "all files".to_string()
    }
}

/// Files that take part in at least one pair of a given clone-type relation.
#[derive(Debug, Clone, Default)]
pub struct CloneTypeMembership {
    members: HashSet<FileId>,
    status: InputStatus,
}

impl CloneTypeMembership {
    pub fn new<I: IntoIterator<Item = FileId>>(members: I) -> Self {
        Self {
            members: members.into_iter().collect(),
            status: InputStatus::Available,
        }
    }

    /// Members are the queries of `index` that have at least one partner.
    /// The index's status is kept.
    pub fn from_index(index: &GroundTruthIndex) -> Self {
        let mut membership = Self::new(
            index
                .queries()
                .filter(|(_, partners)| !partners.is_empty())
                .map(|(id, _)| id.clone()),
        );
        membership.status = index.status().clone();
        membership
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl Stratum for CloneTypeMembership {
    fn admits(&self, id: &FileId) -> bool {
        self.members.contains(id)
    }

    fn describe(&self) -> String {
        format!("clone-type members ({})", self.members.len())
    }

    fn status(&self) -> Option<&InputStatus> {
        Some(&self.status)
    }
}

/// Cyclomatic complexity per file, read from a `fileId,complexity` CSV.
#[derive(Debug, Clone, Default)]
pub struct ComplexityTable {
    values: HashMap<FileId, u32>,
    status: InputStatus,
}

impl ComplexityTable {
    /// Load the table; a header row and rows that do not parse (or are not
    /// UTF-8) are skipped. A file that cannot be opened, or fails mid-read,
    /// gives a table marked `Unavailable` holding whatever was read so far.
    pub fn load(path: &Path) -> Self {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                log::warn!("Complexity table unavailable ({}): {}", path.display(), e);
                return ComplexityTable {
                    values: HashMap::new(),
                    status: InputStatus::unavailable(path, e),
                };
            }
        };

        let mut values = HashMap::new();
        let mut skipped = 0usize;
        let mut status = InputStatus::Available;
        for raw in BufReader::new(file).split(b'\n') {
            let raw = match raw {
                Ok(r) => r,
                Err(e) => {
                    log::warn!("Stopped reading complexity table {}: {}", path.display(), e);
                    status = InputStatus::unavailable(path, e);
                    break;
                }
            };
            let Ok(line) = String::from_utf8(raw) else {
                skipped += 1;
                continue;
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let mut fields = trimmed.split(',').map(str::trim);
            let (Some(name), Some(value)) = (fields.next(), fields.next()) else {
                skipped += 1;
                continue;
            };
            match value.parse::<u32>() {
                Ok(v) if !name.is_empty() => {
                    values.insert(FileId::from_file_name(name), v);
                }
                _ => skipped += 1,
            }
        }

        log::info!(
            "Complexity table {}: {} entries, {} rows skipped",
            path.display(),
            values.len(),
            skipped
        );
        ComplexityTable { values, status }
    }

    pub fn from_entries<I: IntoIterator<Item = (FileId, u32)>>(entries: I) -> Self {
        ComplexityTable {
            values: entries.into_iter().collect(),
            status: InputStatus::Available,
        }
    }

    pub fn get(&self, id: &FileId) -> Option<u32> {
        self.values.get(id).copied()
    }

    /// Table value, or the snippet's line count when the file is not listed.
    pub fn complexity_of(&self, id: &FileId) -> crate::error::Result<u32> {
        match self.get(id) {
            Some(v) => Ok(v),
            None => id.line_count(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn status(&self) -> &InputStatus {
        &self.status
    }
}

/// Side of the complexity threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityClass {
    /// complexity <= threshold
    Low,
    /// complexity > threshold
    High,
}

pub const DEFAULT_COMPLEXITY_THRESHOLD: u32 = 10;

#[derive(Debug, Clone)]
pub struct ComplexityBucket {
    pub table: ComplexityTable,
    pub class: ComplexityClass,
    pub threshold: u32,
}

impl Stratum for ComplexityBucket {
    fn admits(&self, id: &FileId) -> bool {
        match self.table.complexity_of(id) {
            Ok(c) => match self.class {
                ComplexityClass::Low => c <= self.threshold,
                ComplexityClass::High => c > self.threshold,
            },
            Err(e) => {
                log::debug!("Excluding {} from complexity stratum: {}", id, e);
                false
            }
        }
    }

    fn describe(&self) -> String {
        match self.class {
            ComplexityClass::Low => format!("complexity <= {}", self.threshold),
            ComplexityClass::High => format!("complexity > {}", self.threshold),
        }
    }

    fn status(&self) -> Option<&InputStatus> {
        Some(self.table.status())
    }
}

/// Snippets whose line count, from the `_start_end` suffix, is in `[min, max]`.
#[derive(Debug, Clone, Copy)]
pub struct LineCountBucket {
    pub min: u32,
    pub max: u32,
}

impl Stratum for LineCountBucket {
    fn admits(&self, id: &FileId) -> bool {
        match id.line_count() {
            Ok(n) => n >= self.min && n <= self.max,
            Err(e) => {
                log::debug!("Excluding {} from line-count stratum: {}", id, e);
                false
            }
        }
    }

    fn describe(&self) -> String {
        format!("{}..={} lines", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn id(s: &str) -> FileId {
        FileId::new(s)
    }

    #[test]
    fn test_closure_is_a_stratum() {
        let only_c = |f: &FileId| f.as_str() == "c";
        assert!(only_c.admits(&id("c")));
        assert!(!only_c.admits(&id("d")));
    }

    #[test]
    fn test_clone_type_membership_from_index() {
        let index = GroundTruthIndex::from_pairs(vec![(id("a"), id("b"))], |_| true);
        let restricted = index.restrict(&[id("a"), id("lonely")]);
        let members = CloneTypeMembership::from_index(&restricted);
        assert_eq!(members.len(), 1);
        assert!(members.admits(&id("a")));
        assert!(!members.admits(&id("lonely")));
    }

    #[test]
    fn test_complexity_table_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("complexity.csv");
        fs::write(&path, "file,complexity\na_1_5.java,3\nb_1_90.java,14\nbroken\nc_1_2,x\n").unwrap();
        let table = ComplexityTable::load(&path);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(&id("a_1_5")), Some(3));
        assert_eq!(table.get(&id("b_1_90")), Some(14));
        assert!(!table.status().is_degraded());
    }

    #[test]
    fn test_complexity_table_skips_undecodable_rows() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("complexity.csv");
        fs::write(&path, b"a_1_5,3\nbad\xff_1_2,7\nb_1_90,14\n").unwrap();
        let table = ComplexityTable::load(&path);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(&id("b_1_90")), Some(14));
        assert!(!table.status().is_degraded());
    }

    #[test]
    fn test_complexity_falls_back_to_line_count() {
        let table = ComplexityTable::from_entries(vec![(id("a_1_50"), 2)]);
        assert_eq!(table.complexity_of(&id("a_1_50")).unwrap(), 2);
        assert_eq!(table.complexity_of(&id("z_10_19")).unwrap(), 10);
        assert!(table.complexity_of(&id("z")).is_err());
    }

    #[test]
    fn test_complexity_bucket() {
        let table = ComplexityTable::from_entries(vec![(id("simple"), 10), (id("hard"), 11)]);
        let low = ComplexityBucket {
            table: table.clone(),
            class: ComplexityClass::Low,
            threshold: DEFAULT_COMPLEXITY_THRESHOLD,
        };
        let high = ComplexityBucket {
            table,
            class: ComplexityClass::High,
            threshold: DEFAULT_COMPLEXITY_THRESHOLD,
        };
        assert!(low.admits(&id("simple")));
        assert!(!low.admits(&id("hard")));
        assert!(high.admits(&id("hard")));
        // Not in the table: 1..=40 is 40 lines
        assert!(high.admits(&id("unlisted_1_40")));
        // Not in the table and no suffix: excluded from both sides
        assert!(!low.admits(&id("unlisted")));
        assert!(!high.admits(&id("unlisted")));
    }

    #[test]
    fn test_missing_complexity_table_degrades() {
        let temp_dir = TempDir::new().unwrap();
        let table = ComplexityTable::load(&temp_dir.path().join("none.csv"));
        assert!(table.is_empty());
        assert!(table.status().is_degraded());
        assert_eq!(table.complexity_of(&id("f_1_3")).unwrap(), 3);
        let bucket = ComplexityBucket {
            table,
            class: ComplexityClass::Low,
            threshold: DEFAULT_COMPLEXITY_THRESHOLD,
        };
        assert!(bucket.status().is_some_and(InputStatus::is_degraded));
        assert!(AnyFile.status().is_none());
    }

    #[test]
    fn test_line_count_bucket() {
        let bucket = LineCountBucket { min: 5, max: 10 };
        assert!(bucket.admits(&id("f_1_5")));
        assert!(bucket.admits(&id("f_1_10")));
        assert!(!bucket.admits(&id("f_1_4")));
        assert!(!bucket.admits(&id("f_1_11")));
        assert!(!bucket.admits(&id("no-suffix")));
    }
}
