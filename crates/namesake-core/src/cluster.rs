/// Greedy single-link grouping of a directory listing.
///
/// Entries are visited in listing order. The first unclaimed entry becomes a
/// seed and claims every other unclaimed entry whose name scores at least the
/// threshold *against the seed*. Members are never compared with each other,
/// so the result depends on listing order: the first-seen entry owns its
/// matches. This is not a transitive closure.
///
/// Seed-versus-candidate scores are computed in parallel with `rayon`;
/// claiming is applied afterwards in listing order, so the output is identical
/// to the sequential algorithm.
use crate::model::{Entry, Group};
use crate::similarity;
use compact_str::CompactString;
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

/// Default similarity threshold.
pub const DEFAULT_THRESHOLD: f64 = 0.4;

/// Partitions entry lists into similarity groups.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClusterEngine {
    threshold: f64,
}

impl Default for ClusterEngine {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl ClusterEngine {
    /// Create an engine that groups names scoring at least `threshold`.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Whether `candidate` is close enough to `seed` to join its group.
    #[inline]
    pub fn is_similar(&self, seed: &str, candidate: &str) -> bool {
        similarity::score(seed, candidate) >= self.threshold
    }

    /// Partition `entries` into groups of two or more similar entries.
    ///
    /// Entries without a sufficiently similar peer are omitted.
    pub fn cluster(&self, entries: &[Entry]) -> Vec<Arc<Group>> {
        let mut claimed = vec![false; entries.len()];
        let mut groups = Vec::new();

        for i in 0..entries.len() {
            if claimed[i] {
                continue;
            }

            let matches = {
                let taken: &[bool] = &claimed;
                self.matches_for(entries, i, |j| !taken[j])
            };
            if matches.is_empty() {
                continue;
            }

            claimed[i] = true;
            for &j in &matches {
                claimed[j] = true;
            }
            if let Some(group) = build_group(entries, i, &matches) {
                groups.push(Arc::new(group));
            }
        }

        groups
    }

    /// Grow a single group seeded at `entries[seed]`, skipping and then
    /// extending the caller's `claimed` name set.
    ///
    /// Returns `None` (and claims nothing) if the seed is already claimed or
    /// has no unclaimed match.
    pub fn seed_group(
        &self,
        entries: &[Entry],
        seed: usize,
        claimed: &mut HashSet<CompactString>,
    ) -> Option<Group> {
        if claimed.contains(&entries[seed].name) {
            return None;
        }

        let matches = {
            let taken: &HashSet<CompactString> = claimed;
            self.matches_for(entries, seed, |j| !taken.contains(&entries[j].name))
        };
        if matches.is_empty() {
            return None;
        }

        claimed.insert(entries[seed].name.clone());
        for &j in &matches {
            claimed.insert(entries[j].name.clone());
        }
        build_group(entries, seed, &matches)
    }

    /// Indices (in listing order) of free entries similar to `entries[seed]`.
    fn matches_for(
        &self,
        entries: &[Entry],
        seed: usize,
        is_free: impl Fn(usize) -> bool + Sync,
    ) -> Vec<usize> {
        let seed_name = entries[seed].name.as_str();
        (0..entries.len())
            .into_par_iter()
            .filter(|&j| j != seed && is_free(j) && self.is_similar(seed_name, &entries[j].name))
            .collect()
    }
}

fn build_group(entries: &[Entry], seed: usize, matches: &[usize]) -> Option<Group> {
    let members = std::iter::once(seed)
        .chain(matches.iter().copied())
        .map(|k| entries[k].clone())
        .collect();
    Group::new(members)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntryKind;
    use std::path::Path;

    fn listing(names: &[&str]) -> Vec<Entry> {
        names
            .iter()
            .map(|n| Entry::new(Path::new("/d"), n, EntryKind::Folder))
            .collect()
    }

    fn names(group: &Group) -> Vec<&str> {
        group.names().collect()
    }

    #[test]
    fn groups_incremental_suffix_variants() {
        let entries = listing(&["wow", "alpha", "wow01", "wow02", "zebra_stripes"]);
        let groups = ClusterEngine::default().cluster(&entries);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].seed().name, "wow");
        assert_eq!(names(&groups[0]), ["wow", "wow01", "wow02"]);
    }

    #[test]
    fn singletons_are_dropped() {
        let entries = listing(&["cat", "budget", "zebra_stripes"]);
        assert!(ClusterEngine::default().cluster(&entries).is_empty());
    }

    #[test]
    fn first_seen_entry_owns_its_matches() {
        // "data" claims both variants through the prefix-plus-digits rule.
        let entries = listing(&["data", "data2", "data3"]);
        let groups = ClusterEngine::default().cluster(&entries);
        assert_eq!(groups.len(), 1);
        assert_eq!(names(&groups[0]), ["data", "data2", "data3"]);

        // Reordering changes which entry is the seed.
        let entries = listing(&["data2", "data", "data3"]);
        let groups = ClusterEngine::default().cluster(&entries);
        assert_eq!(groups[0].seed().name, "data2");
    }

    #[test]
    fn single_link_is_not_transitive() {
        // "abxd" is close to both neighbours, but "wbxy" is only ever compared
        // with the seed "abcd", and that pair is too far apart.
        let engine = ClusterEngine::new(0.7);
        assert!(engine.is_similar("abcd", "abxd"));
        assert!(engine.is_similar("abxd", "wbxy"));
        assert!(!engine.is_similar("abcd", "wbxy"));

        let entries = listing(&["abcd", "abxd", "wbxy"]);
        let groups = engine.cluster(&entries);
        assert_eq!(groups.len(), 1);
        assert_eq!(names(&groups[0]), ["abcd", "abxd"]);
    }

    #[test]
    fn every_entry_in_at_most_one_group() {
        let entries = listing(&[
            "photos", "photos1", "photos2", "notes", "nodes", "notes2", "invoice", "invoices",
            "cat",
        ]);
        let groups = ClusterEngine::default().cluster(&entries);

        let mut seen = HashSet::new();
        for group in &groups {
            assert!(group.len() >= Group::MIN_MEMBERS);
            for name in group.names() {
                assert!(seen.insert(name.to_owned()), "{name} appears twice");
            }
        }
    }

    #[test]
    fn clustering_is_idempotent() {
        let entries = listing(&["report", "reprot", "report1", "summer", "summer_v2", "cat"]);
        let engine = ClusterEngine::default();
        let first = engine.cluster(&entries);
        let second = engine.cluster(&entries);
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(**a, **b);
        }
    }

    #[test]
    fn seed_group_matches_full_clustering() {
        let entries = listing(&["notes", "nodes", "notes2", "wow", "wow01", "cat"]);
        let engine = ClusterEngine::default();
        let mut claimed = HashSet::new();
        let stepwise: Vec<Group> = (0..entries.len())
            .filter_map(|i| engine.seed_group(&entries, i, &mut claimed))
            .collect();
        let full = engine.cluster(&entries);
        assert_eq!(stepwise.len(), full.len());
        for (a, b) in stepwise.iter().zip(&full) {
            assert_eq!(a, &**b);
        }
    }

    #[test]
    fn seed_group_respects_external_claims() {
        let entries = listing(&["wow", "wow01", "wow02"]);
        let engine = ClusterEngine::default();
        let mut claimed: HashSet<CompactString> = HashSet::new();
        claimed.insert("wow01".into());

        let group = engine.seed_group(&entries, 0, &mut claimed).unwrap();
        assert_eq!(names(&group), ["wow", "wow02"]);
        assert!(claimed.contains("wow"));
        assert!(claimed.contains("wow02"));

        // Nothing left for a second seed.
        assert!(engine.seed_group(&entries, 1, &mut claimed).is_none());
    }
}
