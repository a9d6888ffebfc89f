/// Collision-safe naming for the merged folder and for items moved into it.
use super::ConsolidateError;
use crate::model::{Entry, EntryKind};
use std::path::Path;

/// Suffix appended to the canonical base to form the merged folder name.
pub const MERGED_SUFFIX: &str = "_merged";

/// Suffix used when an item name is already taken inside the merged folder.
pub const COPY_SUFFIX: &str = "_copy";

/// Characters that may not appear in a single path component.
const FORBIDDEN: &[char] = &['/', '\\', '\0'];

/// Validate a user-supplied canonical name and return it trimmed.
pub fn validate_target_name(name: &str) -> Result<&str, ConsolidateError> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.contains(FORBIDDEN)
    {
        return Err(ConsolidateError::InvalidTargetName(name.to_owned()));
    }
    Ok(trimmed)
}

/// `<base>_merged` for `canonical`, before any collision numbering.
///
/// A canonical name equal to a *file* member drops that file's extension.
pub fn merged_base(canonical: &str, sources: &[Entry]) -> Result<String, ConsolidateError> {
    let canonical = validate_target_name(canonical)?;
    let stem = sources
        .iter()
        .find(|e| e.kind == EntryKind::File && e.name == canonical)
        .map_or(canonical, Entry::stem);
    Ok(format!("{stem}{MERGED_SUFFIX}"))
}

/// Derive the merged folder name for `canonical` inside `directory`.
///
/// A canonical name taken from a *file* member loses its extension. The
/// result is `<base>_merged`, or `<base>_merged_<n>` when that name already
/// exists on disk or belongs to one of the `sources`. Gives up with
/// [`ConsolidateError::NameSpaceExhausted`] after `max_attempts` numbered
/// retries.
pub fn target_folder_name(
    canonical: &str,
    sources: &[Entry],
    directory: &Path,
    max_attempts: usize,
) -> Result<String, ConsolidateError> {
    let base = merged_base(canonical, sources)?;

    let is_free = |candidate: &str| {
        !sources.iter().any(|e| e.name == candidate) && !exists(&directory.join(candidate))
    };

    if is_free(&base) {
        return Ok(base);
    }
    let numbered = (1..=max_attempts)
        .map(|n| format!("{base}_{n}"))
        .find(|candidate| is_free(candidate));
    numbered.ok_or(ConsolidateError::NameSpaceExhausted {
        base,
        attempts: max_attempts,
    })
}

/// A name for `entry` that is not yet taken inside `target_dir`.
///
/// Returns the entry's own name when it is free; otherwise appends `_copy`,
/// `_copy1`, `_copy2`, … (before the extension for files).
pub fn unique_name_in(target_dir: &Path, entry: &Entry) -> String {
    if !exists(&target_dir.join(entry.name.as_str())) {
        return entry.name.to_string();
    }

    let (stem, extension) = split_name(entry);
    let candidate = |n: usize| {
        let counter = if n == 0 { String::new() } else { n.to_string() };
        match extension {
            Some(ext) => format!("{stem}{COPY_SUFFIX}{counter}.{ext}"),
            None => format!("{stem}{COPY_SUFFIX}{counter}"),
        }
    };

    (0..)
        .map(candidate)
        .find(|name| !exists(&target_dir.join(name)))
        .unwrap_or_else(|| entry.name.to_string())
}

/// Split a name into stem and original-case extension (files only).
fn split_name(entry: &Entry) -> (&str, Option<&str>) {
    if entry.kind == EntryKind::Folder {
        return (entry.name.as_str(), None);
    }
    let path = Path::new(entry.name.as_str());
    let extension = path.extension().and_then(|e| e.to_str());
    (entry.stem(), extension)
}

/// Existence check that also sees dangling symlinks.
fn exists(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn file(dir: &Path, name: &str) -> Entry {
        Entry::new(dir, name, EntryKind::File)
    }

    fn folder(dir: &Path, name: &str) -> Entry {
        Entry::new(dir, name, EntryKind::Folder)
    }

    #[test]
    fn folder_name_gets_merged_suffix() {
        let tmp = TempDir::new().unwrap();
        let sources = [folder(tmp.path(), "Report"), folder(tmp.path(), "Report2")];
        let name = target_folder_name("Report", &sources, tmp.path(), 10).unwrap();
        assert_eq!(name, "Report_merged");
    }

    #[test]
    fn file_canonical_name_loses_extension() {
        let tmp = TempDir::new().unwrap();
        let sources = [file(tmp.path(), "notes.txt"), file(tmp.path(), "notes2.txt")];
        let name = target_folder_name("notes.txt", &sources, tmp.path(), 10).unwrap();
        assert_eq!(name, "notes_merged");
    }

    #[test]
    fn custom_name_keeps_dots() {
        let tmp = TempDir::new().unwrap();
        let sources = [file(tmp.path(), "a.txt"), file(tmp.path(), "a2.txt")];
        let name = target_folder_name("v1.2 archive", &sources, tmp.path(), 10).unwrap();
        assert_eq!(name, "v1.2 archive_merged");
    }

    #[test]
    fn merged_base_ignores_disk_and_trims() {
        let dir = Path::new("/nonexistent");
        let sources = [file(dir, "notes.txt"), file(dir, "notes2.txt")];
        assert_eq!(merged_base("notes.txt", &sources).unwrap(), "notes_merged");
        assert_eq!(merged_base("  wow ", &sources).unwrap(), "wow_merged");
        assert!(merged_base("a/b", &sources).is_err());
    }

    #[test]
    fn existing_target_gets_numbered() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("Report_merged")).unwrap();
        fs::create_dir(tmp.path().join("Report_merged_1")).unwrap();
        let sources = [folder(tmp.path(), "Report"), folder(tmp.path(), "Report2")];
        let name = target_folder_name("Report", &sources, tmp.path(), 10).unwrap();
        assert_eq!(name, "Report_merged_2");
    }

    #[test]
    fn never_reuses_a_source_name() {
        // The directory is not touched: the collision comes from the plan alone.
        let tmp = TempDir::new().unwrap();
        let sources = [
            folder(tmp.path(), "Report_merged"),
            folder(tmp.path(), "Report_merged_1"),
        ];
        let name = target_folder_name("Report", &sources, tmp.path(), 10).unwrap();
        assert_eq!(name, "Report_merged_2");
        assert!(sources.iter().all(|s| s.name != name));
    }

    #[test]
    fn exhausted_name_space_is_reported() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("x_merged")).unwrap();
        for n in 1..=3 {
            fs::create_dir(tmp.path().join(format!("x_merged_{n}"))).unwrap();
        }
        let sources = [folder(tmp.path(), "x1"), folder(tmp.path(), "x2")];
        let err = target_folder_name("x", &sources, tmp.path(), 3).unwrap_err();
        assert!(matches!(
            err,
            ConsolidateError::NameSpaceExhausted { attempts: 3, .. }
        ));
    }

    #[test]
    fn invalid_names_are_rejected() {
        for bad in ["", "   ", ".", "..", "a/b", "a\\b"] {
            assert!(
                matches!(
                    validate_target_name(bad),
                    Err(ConsolidateError::InvalidTargetName(_))
                ),
                "{bad:?} should be rejected"
            );
        }
        assert_eq!(validate_target_name("  keep  ").unwrap(), "keep");
    }

    #[test]
    fn unique_name_prefers_original() {
        let tmp = TempDir::new().unwrap();
        let e = file(tmp.path(), "wow.txt");
        assert_eq!(unique_name_in(tmp.path(), &e), "wow.txt");
    }

    #[test]
    fn unique_name_inserts_copy_before_extension() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("wow.TXT"), b"x").unwrap();
        let e = file(Path::new("/elsewhere"), "wow.TXT");
        assert_eq!(unique_name_in(tmp.path(), &e), "wow_copy.TXT");

        fs::write(tmp.path().join("wow_copy.TXT"), b"x").unwrap();
        assert_eq!(unique_name_in(tmp.path(), &e), "wow_copy1.TXT");

        fs::write(tmp.path().join("wow_copy1.TXT"), b"x").unwrap();
        assert_eq!(unique_name_in(tmp.path(), &e), "wow_copy2.TXT");
    }

    #[test]
    fn unique_name_for_folders_appends_suffix() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("photos.2024")).unwrap();
        let e = folder(Path::new("/elsewhere"), "photos.2024");
        assert_eq!(unique_name_in(tmp.path(), &e), "photos.2024_copy");
    }
}
