use super::rng::{shuffle, SplitMix64};
use super::strata::{AnyFile, Stratum};
use crate::corpus::FileId;
use crate::ground_truth::GroundTruthIndex;

/// Seeded, reproducible draw from a corpus.
///
/// The corpus is sorted first, so the result only depends on which ids are
/// present, the seed and the size: never on enumeration order or platform.
/// Returns the first `size` ids of the shuffled corpus, or all of them when
/// the corpus is smaller.
pub fn sample<'a, I>(corpus: I, seed: u64, size: usize) -> Vec<FileId>
where
    I: IntoIterator<Item = &'a FileId>,
{
    let mut ids: Vec<FileId> = corpus.into_iter().cloned().collect();
    ids.sort();
    ids.dedup();
    shuffle(&mut ids, &mut SplitMix64::new(seed));
    ids.truncate(size);
    ids
}

/// Scan `initial` in order and keep ids that pass `stratum` and have at least
/// one known clone, stopping once `quota` ids are collected.
///
/// The quota is not guaranteed: if `initial` runs out first the result is
/// shorter, and callers must look at its length.
pub fn select_evaluation_subset(
    initial: &[FileId],
    ground_truth: &GroundTruthIndex,
    quota: usize,
    stratum: &dyn Stratum,
) -> Vec<FileId> {
    let mut selected = Vec::with_capacity(quota.min(initial.len()));
    for id in initial {
        if selected.len() >= quota {
            break;
        }
        if stratum.admits(id) && ground_truth.has_clones(id) {
            selected.push(id.clone());
        }
    }
    if selected.len() < quota {
        log::warn!(
            "Selected {} of {} requested files ({}) from a sample of {}",
            selected.len(),
            quota,
            stratum.describe(),
            initial.len()
        );
    }
    selected
}

/// Everything needed to reproduce one evaluation subset.
pub struct SampleSpec<'a> {
    pub seed: u64,
    /// Size of the initial shuffled draw.
    pub target_size: usize,
    /// Early-stop count for the filtered scan.
    pub quota: usize,
    pub stratum: Option<&'a dyn Stratum>,
}

impl<'a> SampleSpec<'a> {
    pub fn new(seed: u64, target_size: usize, quota: usize) -> Self {
        SampleSpec {
            seed,
            target_size,
            quota,
            stratum: None,
        }
    }

    pub fn with_stratum(mut self, stratum: &'a dyn Stratum) -> Self {
        self.stratum = Some(stratum);
        self
    }

    /// Draw the initial sample and select the evaluation subset from it.
    pub fn draw<'c, I>(&self, corpus: I, ground_truth: &GroundTruthIndex) -> Vec<FileId>
    where
        I: IntoIterator<Item = &'c FileId>,
    {
        let initial = sample(corpus, self.seed, self.target_size);
        let stratum: &dyn Stratum = self.stratum.unwrap_or(&AnyFile);
        let selected = select_evaluation_subset(&initial, ground_truth, self.quota, stratum);
        log::info!(
            "Seed {}: drew {} files, selected {} ({})",
            self.seed,
            initial.len(),
            selected.len(),
            stratum.describe()
        );
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::strata::LineCountBucket;

    fn ids(raw: &[&str]) -> Vec<FileId> {
        raw.iter().map(|s| FileId::new(*s)).collect()
    }

    fn names(ids: &[FileId]) -> Vec<&str> {
        ids.iter().map(FileId::as_str).collect()
    }

    #[test]
    fn test_sample_seed_42_reference() {
        let corpus = ids(&["a", "b", "c", "d"]);
        let drawn = sample(&corpus, 42, 2);
        assert_eq!(names(&drawn), vec!["b", "d"]);
    }

    #[test]
    fn test_sample_is_deterministic() {
        let corpus: Vec<FileId> = (0..500).map(|i| FileId::new(format!("f{}", i))).collect();
        for seed in [0u64, 1, 42, 6_502, u64::MAX] {
            assert_eq!(sample(&corpus, seed, 50), sample(&corpus, seed, 50));
        }
    }

    #[test]
    fn test_sample_ignores_enumeration_order() {
        let forward = ids(&["a", "b", "c", "d", "e"]);
        let backward = ids(&["e", "d", "c", "b", "a"]);
        assert_eq!(sample(&forward, 9, 3), sample(&backward, 9, 3));
    }

    #[test]
    fn test_sample_larger_than_corpus() {
        let corpus = ids(&["a", "b", "c", "d", "e"]);
        let drawn = sample(&corpus, 0, 100);
        assert_eq!(names(&drawn), vec!["c", "d", "a", "b", "e"]);
    }

    #[test]
    fn test_sample_prefix_consistent_across_sizes() {
        let corpus: Vec<FileId> = (0..40).map(|i| FileId::new(format!("f{:02}", i))).collect();
        let small = sample(&corpus, 3, 5);
        let large = sample(&corpus, 3, 20);
        assert_eq!(small[..], large[..5]);
    }

    #[test]
    fn test_select_stops_at_quota() {
        let initial = ids(&["a", "b", "c", "d", "e"]);
        let gt = GroundTruthIndex::from_pairs(
            ids(&["a", "b", "c", "d", "e"])
                .into_iter()
                .map(|f| (f, FileId::new("partner"))),
            |_| true,
        );
        let only_cd = |f: &FileId| f.as_str() == "c" || f.as_str() == "d";
        let selected = select_evaluation_subset(&initial, &gt, 2, &only_cd);
        assert_eq!(names(&selected), vec!["c", "d"]);
    }

    #[test]
    fn test_select_requires_ground_truth() {
        let initial = ids(&["a", "b", "c"]);
        let gt = GroundTruthIndex::from_pairs(vec![(FileId::new("b"), FileId::new("z"))], |_| true);
        let selected = select_evaluation_subset(&initial, &gt, 3, &AnyFile);
        assert_eq!(names(&selected), vec!["b"]);
    }

    #[test]
    fn test_select_quota_not_reached() {
        let initial = ids(&["a", "b"]);
        let gt = GroundTruthIndex::from_pairs(vec![(FileId::new("a"), FileId::new("b"))], |_| true);
        let selected = select_evaluation_subset(&initial, &gt, 10, &AnyFile);
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_select_zero_quota() {
        let initial = ids(&["a", "b"]);
        let gt = GroundTruthIndex::from_pairs(vec![(FileId::new("a"), FileId::new("b"))], |_| true);
        assert!(select_evaluation_subset(&initial, &gt, 0, &AnyFile).is_empty());
    }

    #[test]
    fn test_spec_draw_with_stratum() {
        let corpus = ids(&["a_1_3", "b_1_30", "c_1_4", "d_1_2", "e"]);
        let gt = GroundTruthIndex::from_pairs(
            vec![
                (FileId::new("a_1_3"), FileId::new("b_1_30")),
                (FileId::new("c_1_4"), FileId::new("d_1_2")),
                (FileId::new("e"), FileId::new("a_1_3")),
            ],
            |_| true,
        );
        let short = LineCountBucket { min: 1, max: 5 };
        let spec = SampleSpec::new(11, 5, 10).with_stratum(&short);
        let first = spec.draw(&corpus, &gt);
        let second = spec.draw(&corpus, &gt);
        assert_eq!(first, second);
        let mut got = names(&first);
        got.sort();
        assert_eq!(got, vec!["a_1_3", "c_1_4", "d_1_2"]);
    }
}
