/// Data model for Namesake.
///
/// Re-exports the directory entry and group types.
pub mod entry;
pub mod group;

pub use entry::{Entry, EntryKind};
pub use group::Group;
