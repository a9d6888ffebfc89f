/// A single file or folder directly inside the scanned directory.
///
/// Entries are created by listing a directory and never mutated. Identity is
/// the `name`: the filesystem guarantees names are unique within one
/// directory, so two entries with the same name refer to the same item.
use compact_str::CompactString;
use std::path::{Path, PathBuf};

/// Whether an entry is a regular file or a plain directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Folder,
}

impl EntryKind {
    /// Short label used in list views.
    pub fn label(self) -> &'static str {
        match self {
            Self::File => "File",
            Self::Folder => "Folder",
        }
    }
}

/// One file or folder in the scanned directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    /// File or folder name only (NOT the full path).
    pub name: CompactString,
    /// Full path of the entry.
    pub path: PathBuf,
    pub kind: EntryKind,
    /// Lowercased extension without the dot. Empty for folders and for
    /// extension-less files.
    pub extension: CompactString,
}

impl Entry {
    /// Create an entry for `name` inside `directory`.
    pub fn new(directory: &Path, name: &str, kind: EntryKind) -> Self {
        let extension = match kind {
            EntryKind::Folder => CompactString::default(),
            EntryKind::File => Path::new(name)
                .extension()
                .map(|ext| CompactString::new(ext.to_string_lossy().to_lowercase()))
                .unwrap_or_default(),
        };
        Self {
            name: CompactString::new(name),
            path: directory.join(name),
            kind,
            extension,
        }
    }

    #[inline]
    pub fn is_folder(&self) -> bool {
        self.kind == EntryKind::Folder
    }

    /// The name with the extension removed (files only).
    ///
    /// Folders and extension-less files return the full name.
    pub fn stem(&self) -> &str {
        if self.is_folder() || self.extension.is_empty() {
            return &self.name;
        }
        Path::new(self.name.as_str())
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.name)
    }
}
