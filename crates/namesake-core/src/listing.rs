/// Non-recursive directory listing.
///
/// Lists the immediate children of a directory as [`Entry`] values. Only
/// regular files and plain directories are returned; symlinks, sockets,
/// devices and entries whose type cannot be read are skipped with a debug log.
///
/// Entries are sorted by name so that repeated listings of an unchanged
/// directory produce the same order, which keeps grouping deterministic.
use crate::model::{Entry, EntryKind};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ListingError {
    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// List the files and folders directly inside `directory`.
pub fn list_directory(directory: &Path) -> Result<Vec<Entry>, ListingError> {
    if !directory.is_dir() {
        return Err(ListingError::NotADirectory(directory.to_path_buf()));
    }

    let read_dir = std::fs::read_dir(directory).map_err(|source| ListingError::Io {
        path: directory.to_path_buf(),
        source,
    })?;

    let mut entries = Vec::new();
    for item in read_dir {
        let item = match item {
            Ok(i) => i,
            Err(err) => {
                debug!("Skipping unreadable entry in {}: {err}", directory.display());
                continue;
            }
        };

        // `DirEntry::file_type` does not follow symlinks.
        let kind = match item.file_type() {
            Ok(t) if t.is_dir() => EntryKind::Folder,
            Ok(t) if t.is_file() => EntryKind::File,
            Ok(_) => {
                debug!("Skipping special entry {}", item.path().display());
                continue;
            }
            Err(err) => {
                debug!("Skipping {}: {err}", item.path().display());
                continue;
            }
        };

        let name = item.file_name();
        let Some(name) = name.to_str() else {
            debug!("Skipping non-UTF-8 name {:?}", item.path());
            continue;
        };
        entries.push(Entry::new(directory, name, kind));
    }

    entries.sort_unstable_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}
