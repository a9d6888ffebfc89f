/// Incremental regrouping after filesystem change notifications.
///
/// Only groups touched by a change are rebuilt. Untouched groups are carried
/// over as the same `Arc`, so a caller can tell at a glance which groups
/// actually changed. Changed names that are not in any prior group may seed
/// new groups.
use crate::cluster::ClusterEngine;
use crate::listing::{list_directory, ListingError};
use crate::model::{Entry, Group};
use compact_str::CompactString;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Result of an incremental rescan.
#[derive(Debug)]
pub enum RescanOutcome {
    /// The groups are exactly the prior ones; nothing to redraw.
    Unchanged,
    /// The full, updated group list.
    Updated(Vec<Arc<Group>>),
}

/// Recompute the groups affected by `changed` (names of direct children of
/// `directory`).
///
/// On a listing error the prior groups are left for the caller to keep.
pub fn rescan(
    prior: &[Arc<Group>],
    changed: &BTreeSet<String>,
    directory: &Path,
    engine: &ClusterEngine,
) -> Result<RescanOutcome, ListingError> {
    let entries = list_directory(directory)?;
    Ok(regroup(prior, changed, &entries, engine))
}

/// The pure part of [`rescan`], against an already taken listing.
pub fn regroup(
    prior: &[Arc<Group>],
    changed: &BTreeSet<String>,
    entries: &[Entry],
    engine: &ClusterEngine,
) -> RescanOutcome {
    let changed: BTreeSet<&str> = changed
        .iter()
        .map(String::as_str)
        .filter(|name| !name.contains(['/', '\\']))
        .collect();
    let index: HashMap<&str, usize> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| (e.name.as_str(), i))
        .collect();

    // Changed names that exist now but belonged to no prior group. A prior
    // group whose seed matches one of them is rebuilt so the newcomer can
    // join it, as a full scan would do.
    let newcomers: Vec<&str> = changed
        .iter()
        .copied()
        .filter(|name| index.contains_key(name))
        .filter(|name| !prior.iter().any(|g| g.contains(name)))
        .collect();

    let mut claimed: HashSet<CompactString> = HashSet::new();
    let mut groups: Vec<Arc<Group>> = Vec::with_capacity(prior.len());

    for group in prior {
        let survivors: Vec<&Entry> = group
            .members()
            .iter()
            .filter(|m| index.contains_key(m.name.as_str()))
            .collect();
        let dirty = survivors.len() != group.len();
        let touched = group.names().any(|n| changed.contains(n))
            || newcomers
                .iter()
                .any(|n| engine.is_similar(&group.seed().name, n));
        // A group rebuilt earlier in this pass may have taken one of ours.
        let overlapped = group.names().any(|n| claimed.contains(n));

        if !dirty && !touched && !overlapped {
            claimed.extend(group.members().iter().map(|m| m.name.clone()));
            groups.push(Arc::clone(group));
            continue;
        }

        debug!("Rebuilding group seeded at {}", group.seed().name);
        if let Some(rebuilt) = rebuild(group, &survivors, entries, &index, engine, &mut claimed) {
            groups.push(Arc::new(rebuilt));
        }
    }

    for name in &changed {
        let Some(&seed) = index.get(name) else {
            continue;
        };
        if let Some(group) = engine.seed_group(entries, seed, &mut claimed) {
            debug!("New group seeded at {name}");
            groups.push(Arc::new(group));
        }
    }

    if same_groups(prior, &groups) {
        RescanOutcome::Unchanged
    } else {
        RescanOutcome::Updated(groups)
    }
}

/// Reseed a prior group at its original seed, or at its first survivor when
/// the seed is gone.
fn rebuild(
    group: &Group,
    survivors: &[&Entry],
    entries: &[Entry],
    index: &HashMap<&str, usize>,
    engine: &ClusterEngine,
    claimed: &mut HashSet<CompactString>,
) -> Option<Group> {
    let seed = survivors
        .iter()
        .find(|m| m.name == group.seed().name)
        .or_else(|| survivors.first())?;
    let &seed_idx = index.get(seed.name.as_str())?;
    engine.seed_group(entries, seed_idx, claimed)
}

fn same_groups(prior: &[Arc<Group>], current: &[Arc<Group>]) -> bool {
    prior.len() == current.len()
        && prior
            .iter()
            .zip(current)
            .all(|(a, b)| Arc::ptr_eq(a, b) || a.names().eq(b.names()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntryKind;

    fn listing(names: &[&str]) -> Vec<Entry> {
        let mut entries: Vec<_> = names
            .iter()
            .map(|n| Entry::new(Path::new("/d"), n, EntryKind::Folder))
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }

    fn changed(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn updated(outcome: RescanOutcome) -> Vec<Arc<Group>> {
        match outcome {
            RescanOutcome::Updated(groups) => groups,
            RescanOutcome::Unchanged => panic!("expected an update"),
        }
    }

    #[test]
    fn unrelated_change_is_unchanged() {
        let engine = ClusterEngine::default();
        let before = listing(&["cat", "wow", "wow01"]);
        let prior = engine.cluster(&before);

        let after = listing(&["cat", "dog_food_bowl", "wow", "wow01"]);
        let outcome = regroup(&prior, &changed(&["dog_food_bowl"]), &after, &engine);
        assert!(matches!(outcome, RescanOutcome::Unchanged));
    }

    #[test]
    fn new_member_joins_existing_group() {
        let engine = ClusterEngine::default();
        let prior = engine.cluster(&listing(&["wow", "wow01"]));

        let after = listing(&["wow", "wow01", "wow02"]);
        let groups = updated(regroup(&prior, &changed(&["wow02"]), &after, &engine));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].names().collect::<Vec<_>>(), ["wow", "wow01", "wow02"]);
    }

    #[test]
    fn untouched_groups_keep_their_pointer() {
        let engine = ClusterEngine::default();
        let before = listing(&["data", "data2", "wow", "wow01"]);
        let prior = engine.cluster(&before);
        assert_eq!(prior.len(), 2);

        let after = listing(&["data", "data2", "wow", "wow01", "wow02"]);
        let groups = updated(regroup(&prior, &changed(&["wow02"]), &after, &engine));
        assert!(Arc::ptr_eq(&groups[0], &prior[0]), "data group was rebuilt");
        assert!(!Arc::ptr_eq(&groups[1], &prior[1]));
    }

    #[test]
    fn group_below_two_members_is_dropped() {
        let engine = ClusterEngine::default();
        let prior = engine.cluster(&listing(&["wow", "wow01"]));

        let after = listing(&["wow"]);
        let groups = updated(regroup(&prior, &changed(&["wow01"]), &after, &engine));
        assert!(groups.is_empty());
    }

    #[test]
    fn vanished_seed_is_replaced_by_first_survivor() {
        let engine = ClusterEngine::default();
        let prior = engine.cluster(&listing(&["wow", "wow01", "wow02"]));
        assert_eq!(prior[0].seed().name, "wow");

        let after = listing(&["wow01", "wow02"]);
        let groups = updated(regroup(&prior, &changed(&["wow"]), &after, &engine));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].seed().name, "wow01");
        assert_eq!(groups[0].names().collect::<Vec<_>>(), ["wow01", "wow02"]);
    }

    #[test]
    fn changed_names_can_seed_new_groups() {
        let engine = ClusterEngine::default();
        let prior = engine.cluster(&listing(&["cat", "invoice"]));
        assert!(prior.is_empty());

        let after = listing(&["cat", "invoice", "invoices"]);
        let groups = updated(regroup(&prior, &changed(&["invoices"]), &after, &engine));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].seed().name, "invoices");
        assert!(groups[0].contains("invoice"));
    }

    #[test]
    fn new_group_forms_beside_an_untouched_one() {
        let engine = ClusterEngine::default();
        let prior = engine.cluster(&listing(&["invoice", "wow", "wow01"]));
        assert_eq!(prior.len(), 1);

        let after = listing(&["invoice", "invoices", "wow", "wow01"]);
        let groups = updated(regroup(&prior, &changed(&["invoices"]), &after, &engine));
        assert_eq!(groups.len(), 2);

        let wow = groups.iter().find(|g| g.seed().name == "wow").unwrap();
        assert!(Arc::ptr_eq(wow, &prior[0]), "wow group was rebuilt");
        let invoices = groups.iter().find(|g| g.seed().name == "invoices").unwrap();
        assert_eq!(invoices.len(), 2);
        assert!(invoices.contains("invoice"));
    }

    #[test]
    fn nested_paths_are_ignored() {
        let engine = ClusterEngine::default();
        let prior = engine.cluster(&listing(&["wow", "wow01"]));
        let after = listing(&["wow", "wow01"]);
        let outcome = regroup(&prior, &changed(&["wow/inner", "wow01\\x"]), &after, &engine);
        assert!(matches!(outcome, RescanOutcome::Unchanged));
    }

    #[test]
    fn no_entry_in_two_groups() {
        let engine = ClusterEngine::default();
        let prior = engine.cluster(&listing(&["notes", "notes2", "wow", "wow01"]));

        let after = listing(&["nodes", "notes", "notes2", "wow", "wow01", "wow02"]);
        let groups = updated(regroup(&prior, &changed(&["nodes", "wow02"]), &after, &engine));

        let mut seen = HashSet::new();
        for group in &groups {
            assert!(group.len() >= Group::MIN_MEMBERS);
            for name in group.names() {
                assert!(seen.insert(name.to_owned()), "{name} appears twice");
            }
        }
        assert!(seen.contains("nodes"));
        assert!(seen.contains("wow02"));
    }

    #[test]
    fn rescan_reads_the_directory() {
        let tmp = tempfile::TempDir::new().unwrap();
        for name in ["wow", "wow01"] {
            std::fs::create_dir(tmp.path().join(name)).unwrap();
        }
        let engine = ClusterEngine::default();
        let prior = engine.cluster(&list_directory(tmp.path()).unwrap());

        std::fs::create_dir(tmp.path().join("wow02")).unwrap();
        let groups = updated(rescan(&prior, &changed(&["wow02"]), tmp.path(), &engine).unwrap());
        assert_eq!(groups[0].len(), 3);

        let err = rescan(&prior, &changed(&["x"]), &tmp.path().join("gone"), &engine);
        assert!(err.is_err());
    }
}
