/// Entries opted out of the next consolidation of their group.
///
/// Excluded entries stay visible in the group list; they are only filtered out
/// when a consolidation plan is built. Membership is keyed by full path.
use crate::model::Entry;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Clone)]
pub struct ExclusionRegistry {
    paths: HashSet<PathBuf>,
}

impl ExclusionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the path was not already excluded.
    pub fn exclude(&mut self, path: impl Into<PathBuf>) -> bool {
        self.paths.insert(path.into())
    }

    /// Returns `true` if the path was excluded before.
    pub fn include(&mut self, path: &Path) -> bool {
        self.paths.remove(path)
    }

    pub fn is_excluded(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    /// Flip the state of `path`; returns the new "excluded" state.
    pub fn toggle(&mut self, path: &Path) -> bool {
        if self.include(path) {
            false
        } else {
            self.exclude(path)
        }
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// The members that are not excluded, in their original order.
    pub fn filter(&self, members: &[Entry]) -> Vec<Entry> {
        members
            .iter()
            .filter(|m| !self.is_excluded(&m.path))
            .cloned()
            .collect()
    }
}
