/// End-to-end consolidation tests: list a real directory, group it, apply
/// exclusions, consolidate and list again.
use namesake_core::cluster::ClusterEngine;
use namesake_core::consolidate::worker::start_consolidation;
use namesake_core::consolidate::{
    consolidate, ConsolidateError, ConsolidateOptions, ConsolidationPlan, RelocateMode,
};
use namesake_core::exclusion::ExclusionRegistry;
use namesake_core::listing::list_directory;
use namesake_core::model::{Entry, EntryKind};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn options() -> ConsolidateOptions {
    ConsolidateOptions {
        shortcut_dir: None,
        ..ConsolidateOptions::default()
    }
}

fn names_in(dir: &Path) -> Vec<String> {
    list_directory(dir)
        .unwrap()
        .into_iter()
        .map(|e| e.name.to_string())
        .collect()
}

/// ```text
/// root/
///   cat.txt
///   wow/        (contains inner.txt)
///   wow01/
///   wow02       (file)
/// ```
fn build_wow_dir(root: &Path) {
    fs::create_dir(root.join("wow")).unwrap();
    fs::write(root.join("wow").join("inner.txt"), b"inner").unwrap();
    fs::create_dir(root.join("wow01")).unwrap();
    fs::write(root.join("wow02"), b"x").unwrap();
    fs::write(root.join("cat.txt"), b"meow").unwrap();
}

// ── Tests ─────────────────────────────────────────────────────────────────────

/// Excluded members stay behind; everything else lands in `<seed>_merged`.
#[test]
fn merge_group_with_exclusion() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    build_wow_dir(tmp.path());

    let groups = ClusterEngine::default().cluster(&list_directory(tmp.path()).unwrap());
    assert_eq!(groups.len(), 1);
    let group = &groups[0];
    assert_eq!(group.seed().name, "wow");

    let mut exclusions = ExclusionRegistry::new();
    exclusions.exclude(tmp.path().join("wow01"));

    let plan = ConsolidationPlan::from_group(group, &exclusions, None);
    let outcome = consolidate(&plan, tmp.path(), &options()).unwrap();

    assert!(outcome.is_complete());
    assert_eq!(outcome.moved_count, 2);
    assert_eq!(names_in(tmp.path()), ["cat.txt", "wow01", "wow_merged"]);
    assert_eq!(names_in(&outcome.target), ["wow", "wow02"]);
    assert_eq!(
        fs::read(outcome.target.join("wow").join("inner.txt")).unwrap(),
        b"inner"
    );
}

/// Excluding all but one member makes the group ineligible.
#[test]
fn excluding_all_but_one_is_insufficient() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    build_wow_dir(tmp.path());

    let groups = ClusterEngine::default().cluster(&list_directory(tmp.path()).unwrap());
    let mut exclusions = ExclusionRegistry::new();
    exclusions.exclude(tmp.path().join("wow01"));
    exclusions.exclude(tmp.path().join("wow02"));

    let plan = ConsolidationPlan::from_group(&groups[0], &exclusions, None);
    let err = consolidate(&plan, tmp.path(), &options()).unwrap_err();
    assert!(matches!(err, ConsolidateError::InsufficientMembers { found: 1 }));
    assert_eq!(names_in(tmp.path()), ["cat.txt", "wow", "wow01", "wow02"]);
}

/// A pre-existing `Report_merged` pushes the target to `Report_merged_1`.
#[test]
fn existing_merged_folder_is_not_reused() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    let dir = tmp.path();
    fs::create_dir(dir.join("Report_merged")).unwrap();
    let sources: Vec<Entry> = ["Report", "Report_old", "Report2"]
        .into_iter()
        .map(|name| {
            fs::create_dir(dir.join(name)).unwrap();
            Entry::new(dir, name, EntryKind::Folder)
        })
        .collect();

    let plan = ConsolidationPlan::new("Report", sources);
    let outcome = consolidate(&plan, dir, &options()).unwrap();

    assert_eq!(outcome.target, dir.join("Report_merged_1"));
    assert_eq!(outcome.moved_count, 3);
    assert_eq!(names_in(&outcome.target), ["Report", "Report2", "Report_old"]);
    assert!(names_in(&dir.join("Report_merged")).is_empty());
}

/// Copy mode through the background worker leaves the sources in place.
#[test]
fn worker_copies_in_background() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    build_wow_dir(tmp.path());

    let groups = ClusterEngine::default().cluster(&list_directory(tmp.path()).unwrap());
    let plan = ConsolidationPlan::from_group(&groups[0], &ExclusionRegistry::new(), Some("wow"))
        .with_mode(RelocateMode::Copy);
    let handle = start_consolidation(plan, tmp.path().to_path_buf(), options());
    assert_eq!(handle.item_count, 3);

    let outcome = handle
        .result_rx
        .recv_timeout(Duration::from_secs(30))
        .expect("merge worker did not answer")
        .unwrap();
    assert!(outcome.is_complete());
    assert_eq!(
        names_in(tmp.path()),
        ["cat.txt", "wow", "wow01", "wow02", "wow_merged"]
    );
    assert_eq!(names_in(&outcome.target), ["wow", "wow01", "wow02"]);
}

/// After a merge, the merged folder does not form a new group with leftovers.
#[test]
fn rescan_after_merge_is_stable() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    build_wow_dir(tmp.path());
    let engine = ClusterEngine::default();

    let groups = engine.cluster(&list_directory(tmp.path()).unwrap());
    let plan = ConsolidationPlan::from_group(&groups[0], &ExclusionRegistry::new(), None);
    consolidate(&plan, tmp.path(), &options()).unwrap();

    let after = engine.cluster(&list_directory(tmp.path()).unwrap());
    assert!(after.is_empty(), "unexpected groups: {after:?}");
}
