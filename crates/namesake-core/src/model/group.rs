/// A cluster of entries whose names are similar to the group seed.
use super::entry::Entry;

/// A group of at least two similar entries.
///
/// `members[0]` is always the seed -- the entry that started the group during
/// single-link clustering. The remaining members are kept in discovery order,
/// not alphabetical order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    members: Vec<Entry>,
}

impl Group {
    /// Minimum number of members for a set of entries to count as a group.
    pub const MIN_MEMBERS: usize = 2;

    /// Build a group from a seed followed by its matches.
    ///
    /// Returns `None` when fewer than [`Group::MIN_MEMBERS`] entries are given.
    pub fn new(members: Vec<Entry>) -> Option<Self> {
        if members.len() < Self::MIN_MEMBERS {
            return None;
        }
        Some(Self { members })
    }

    /// The entry that initiated the group.
    pub fn seed(&self) -> &Entry {
        &self.members[0]
    }

    /// All members, seed first.
    pub fn members(&self) -> &[Entry] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always `false`; groups hold at least two members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether an entry called `name` belongs to this group.
    pub fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|m| m.name == name)
    }

    /// Member names in order, for display and comparisons.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.name.as_str())
    }
}
