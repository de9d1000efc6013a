use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::relation::{parse_pairs, RelationLayout};
use crate::corpus::{Corpus, FileId};
use crate::error::InputStatus;

/// Known clone partners per file, immutable once built.
///
/// Pairs are stored in both directions. A repeated pair (in either
/// orientation) is kept once, at the position it was first seen, so lookups
/// return partners in relation-file order without duplicates.
#[derive(Debug, Clone, Default)]
pub struct GroundTruthIndex {
    clones: BTreeMap<FileId, Vec<FileId>>,
    status: InputStatus,
}

impl GroundTruthIndex {
    /// Build the index from a relation file, keeping only pairs whose two
    /// ids are both present in `scope`.
    ///
    /// An unreadable relation file does not fail the build: the index comes
    /// back empty with an `Unavailable` status and a warning is logged. An
    /// unavailable scope is carried over the same way, since no pair can be
    /// in it.
    pub fn build(source: &Path, layout: &RelationLayout, scope: &Corpus) -> Self {
        if scope.is_degraded() {
            log::warn!(
                "Ground truth scope {} is unavailable; every pair will be out of scope",
                scope.root().display()
            );
        }

        let file = match File::open(source) {
            Ok(f) => f,
            Err(e) => return Self::unavailable(source, e),
        };
        let parsed = match parse_pairs(BufReader::new(file), layout) {
            Ok(p) => p,
            Err(e) => return Self::unavailable(source, e),
        };

        let total = parsed.pairs.len();
        let mut index = Self::from_pairs(parsed.pairs, |id| scope.contains(id));
        if scope.is_degraded() {
            index.status = scope.status().clone();
        }
        log::info!(
            "Ground truth {}: {} pairs read, {} rows skipped, {} files with clones in scope",
            source.display(),
            total,
            parsed.skipped_rows,
            index.len()
        );
        if index.is_empty() {
            log::warn!("Ground truth {} has no clone pairs inside {}", source.display(), scope.root().display());
        }
        index
    }

    /// Empty index recording why its source could not be read.
    pub fn unavailable(source: &Path, reason: impl std::fmt::Display) -> Self {
        log::warn!("Ground truth unavailable ({}): {}", source.display(), reason);
        GroundTruthIndex {
            clones: BTreeMap::new(),
            status: InputStatus::unavailable(source, reason),
        }
    }

    /// Build from in-memory pairs; `in_scope` decides which ids are kept.
    /// Self-pairs are ignored.
    pub fn from_pairs<I, F>(pairs: I, in_scope: F) -> Self
    where
        I: IntoIterator<Item = (FileId, FileId)>,
        F: Fn(&FileId) -> bool,
    {
        let mut clones: BTreeMap<FileId, Vec<FileId>> = BTreeMap::new();
        let mut seen: HashSet<(FileId, FileId)> = HashSet::new();

        for (a, b) in pairs {
            if a == b || !in_scope(&a) || !in_scope(&b) {
                continue;
            }
            if seen.insert((a.clone(), b.clone())) {
                clones.entry(a.clone()).or_default().push(b.clone());
            }
            if seen.insert((b.clone(), a.clone())) {
                clones.entry(b).or_default().push(a);
            }
        }

        GroundTruthIndex {
            clones,
            status: InputStatus::Available,
        }
    }

    /// Clone partners of `id`; empty if the id is unknown.
    pub fn lookup(&self, id: &FileId) -> &[FileId] {
        self.clones.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_clones(&self, id: &FileId) -> bool {
        !self.lookup(id).is_empty()
    }

    /// Sub-index holding exactly the given ids.
    ///
    /// Every requested id gets an entry, with an empty partner list when it
    /// has no known clones, so it is still counted as a query. Partner lists
    /// themselves are not filtered.
    pub fn restrict<'a, I>(&self, ids: I) -> Self
    where
        I: IntoIterator<Item = &'a FileId>,
    {
        let clones = ids
            .into_iter()
            .map(|id| (id.clone(), self.lookup(id).to_vec()))
            .collect();
        GroundTruthIndex {
            clones,
            status: self.status.clone(),
        }
    }

    /// Queries and their partners, in id order.
    pub fn queries(&self) -> impl Iterator<Item = (&FileId, &[FileId])> {
        self.clones.iter().map(|(id, partners)| (id, partners.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.clones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clones.is_empty()
    }

    pub fn status(&self) -> &InputStatus {
        &self.status
    }

    pub fn is_degraded(&self) -> bool {
        self.status.is_degraded()
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

    fn pairs(raw: &[(&str, &str)]) -> Vec<(FileId, FileId)> {
        raw.iter().map(|(a, b)| (id(a), id(b))).collect()
    }

    #[test]
    fn test_pairs_are_symmetric() {
        let index = GroundTruthIndex::from_pairs(pairs(&[("a", "b"), ("a", "c")]), |_| true);
        assert_eq!(index.lookup(&id("a")), &[id("b"), id("c")]);
        assert_eq!(index.lookup(&id("b")), &[id("a")]);
        assert_eq!(index.lookup(&id("c")), &[id("a")]);
        assert!(index.lookup(&id("z")).is_empty());
    }

    #[test]
    fn test_duplicate_pairs_are_kept_once() {
        let index = GroundTruthIndex::from_pairs(
            pairs(&[("a", "b"), ("a", "b"), ("b", "a"), ("a", "c")]),
            |_| true,
        );
        assert_eq!(index.lookup(&id("a")), &[id("b"), id("c")]);
        assert_eq!(index.lookup(&id("b")), &[id("a")]);
    }

    #[test]
    fn test_self_pairs_ignored() {
        let index = GroundTruthIndex::from_pairs(pairs(&[("a", "a")]), |_| true);
        assert!(index.is_empty());
    }

    #[test]
    fn test_scope_requires_both_ids() {
        let scope: HashSet<FileId> = [id("a"), id("b")].into_iter().collect();
        let index = GroundTruthIndex::from_pairs(
            pairs(&[("a", "b"), ("a", "outside")]),
            |f| scope.contains(f),
        );
        assert_eq!(index.lookup(&id("a")), &[id("b")]);
        assert!(!index.has_clones(&id("outside")));
    }

    #[test]
    fn test_restrict_keeps_requested_ids_only() {
        let index = GroundTruthIndex::from_pairs(pairs(&[("a", "b"), ("c", "d")]), |_| true);
        let sample = vec![id("a"), id("x")];
        let sub = index.restrict(&sample);
        assert_eq!(sub.len(), 2);
        assert_eq!(sub.lookup(&id("a")), &[id("b")]);
        assert!(sub.lookup(&id("x")).is_empty());
        assert!(sub.lookup(&id("c")).is_empty());
        let queries: Vec<&str> = sub.queries().map(|(q, _)| q.as_str()).collect();
        assert_eq!(queries, vec!["a", "x"]);
    }

    #[test]
    fn test_build_from_file_within_directory_scope() {
        let temp_dir = TempDir::new().unwrap();
        let bucket = temp_dir.path().join("0");
        fs::create_dir_all(&bucket).unwrap();
        for name in ["a_1_5.java", "b_1_9.java", "c_2_4.java"] {
            fs::write(bucket.join(name), "class X {}").unwrap();
        }
        let relation = temp_dir.path().join("T1.csv");
        fs::write(&relation, "a_1_5,b_1_9\nb_1_9,c_2_4\nc_2_4,gone_1_2\n").unwrap();

        let scope = Corpus::discover(&bucket, "java");
        let index = GroundTruthIndex::build(&relation, &RelationLayout::default(), &scope);

        assert!(!index.is_degraded());
        assert_eq!(index.len(), 3);
        assert_eq!(index.lookup(&id("b_1_9")), &[id("a_1_5"), id("c_2_4")]);
        assert_eq!(index.lookup(&id("c_2_4")), &[id("b_1_9")]);
    }

    #[test]
    fn test_build_unreadable_source_degrades_to_empty() {
        let temp_dir = TempDir::new().unwrap();
        let scope = Corpus::from_ids(vec![id("a"), id("b")]);
        let index = GroundTruthIndex::build(
            &temp_dir.path().join("missing.csv"),
            &RelationLayout::default(),
            &scope,
        );
        assert!(index.is_empty());
        assert!(index.is_degraded());
        assert!(index.status().to_error().is_some());
    }

    #[test]
    fn test_build_skips_undecodable_rows() {
        let temp_dir = TempDir::new().unwrap();
        let relation = temp_dir.path().join("T1.csv");
        fs::write(&relation, b"a,b\nc,d\ne\xff,f\n").unwrap();
        let scope = Corpus::from_ids(vec![id("a"), id("b"), id("c"), id("d")]);
        let index = GroundTruthIndex::build(&relation, &RelationLayout::default(), &scope);
        assert!(!index.is_degraded());
        assert_eq!(index.len(), 4);
        assert_eq!(index.lookup(&id("d")), &[id("c")]);
    }

    #[test]
    fn test_build_in_unavailable_scope_is_degraded() {
        let temp_dir = TempDir::new().unwrap();
        let relation = temp_dir.path().join("T1.csv");
        fs::write(&relation, "a_1_5,b_1_9\n").unwrap();
        let scope = Corpus::discover(&temp_dir.path().join("no_such_bucket"), "java");
        let index = GroundTruthIndex::build(&relation, &RelationLayout::default(), &scope);
        assert!(index.is_empty());
        assert!(index.is_degraded());
        assert!(index.restrict(&[id("a_1_5")]).is_degraded());
    }

    #[test]
    fn test_restrict_carries_degraded_status() {
        let index = GroundTruthIndex::unavailable(Path::new("gone.csv"), "No such file");
        let sub = index.restrict(&[id("a")]);
        assert!(sub.is_degraded());
        assert!(sub.lookup(&id("a")).is_empty());
    }
}
