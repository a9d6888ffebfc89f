/// Filesystem primitives used by the consolidation transaction.
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// How grouped items are brought into the merged folder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelocateMode {
    /// Rename into the merged folder; the source disappears as part of the
    /// operation.
    #[default]
    Move,
    /// Copy into the merged folder and leave the source in place.
    Copy,
}

impl RelocateMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Move => "Move",
            Self::Copy => "Copy",
        }
    }
}

/// Relocate `source` to `dest` according to `mode`.
///
/// `Move` is a single `rename`: it never falls back to copy-then-delete, so a
/// cross-device move fails and is reported rather than half-done. A failed
/// `Copy` removes whatever it had already written under `dest`.
pub fn relocate(source: &Path, dest: &Path, mode: RelocateMode) -> io::Result<()> {
    match mode {
        RelocateMode::Move => std::fs::rename(source, dest),
        RelocateMode::Copy => copy_recursive(source, dest).inspect_err(|_| discard_partial(dest)),
    }
}

fn discard_partial(dest: &Path) {
    let removed = match dest.symlink_metadata() {
        Ok(meta) if meta.is_dir() => std::fs::remove_dir_all(dest),
        Ok(_) => std::fs::remove_file(dest),
        Err(_) => return,
    };
    if let Err(err) = removed {
        debug!("Could not remove partial copy {}: {err}", dest.display());
    }
}

/// Copy a file, or a directory and everything below it.
fn copy_recursive(source: &Path, dest: &Path) -> io::Result<()> {
    let meta = source.symlink_metadata()?;
    if !meta.is_dir() {
        return std::fs::copy(source, dest).map(|_| ());
    }

    std::fs::create_dir(dest)?;
    for child in std::fs::read_dir(source)? {
        let child = child?;
        copy_recursive(&child.path(), &dest.join(child.file_name()))?;
    }
    Ok(())
}

/// Create a link named after `target` inside `shortcut_dir` pointing at it.
pub fn create_shortcut(target: &Path, shortcut_dir: &Path) -> io::Result<PathBuf> {
    let name = target
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "target has no name"))?;
    let link = shortcut_dir.join(name);
    symlink_dir(target, &link)?;
    Ok(link)
}

#[cfg(unix)]
fn symlink_dir(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink_dir(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}

#[cfg(not(any(unix, windows)))]
fn symlink_dir(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "shortcuts are not supported on this platform",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn move_removes_source() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("a.txt");
        fs::write(&src, b"hello").unwrap();
        let dest = tmp.path().join("b.txt");

        relocate(&src, &dest, RelocateMode::Move).unwrap();
        assert!(!src.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"hello");
    }

    #[test]
    fn copy_keeps_source_and_copies_tree() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("album");
        fs::create_dir_all(src.join("disc1")).unwrap();
        fs::write(src.join("disc1").join("track.mp3"), b"la").unwrap();
        fs::write(src.join("cover.jpg"), b"img").unwrap();
        let dest = tmp.path().join("album_copy");

        relocate(&src, &dest, RelocateMode::Copy).unwrap();
        assert!(src.join("cover.jpg").exists());
        assert_eq!(fs::read(dest.join("disc1").join("track.mp3")).unwrap(), b"la");
        assert_eq!(fs::read(dest.join("cover.jpg")).unwrap(), b"img");
    }

    #[test]
    fn move_of_missing_source_fails() {
        let tmp = TempDir::new().unwrap();
        let err = relocate(
            &tmp.path().join("missing"),
            &tmp.path().join("dest"),
            RelocateMode::Move,
        )
        .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[cfg(unix)]
    #[test]
    fn failed_copy_leaves_no_partial_tree() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("album");
        fs::create_dir(&src).unwrap();
        fs::write(src.join("a_cover.jpg"), b"img").unwrap();
        let locked = src.join("z_track.mp3");
        fs::write(&locked, b"la").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read(&locked).is_ok() {
            // Running as root: permissions are not enforced.
            return;
        }
        let dest = tmp.path().join("album_copy");

        let err = relocate(&src, &dest, RelocateMode::Copy).unwrap_err();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert!(!dest.exists());
        assert!(src.join("a_cover.jpg").exists());
        assert!(locked.exists());
    }

    #[cfg(unix)]
    #[test]
    fn shortcut_points_at_target() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("wow_merged");
        fs::create_dir(&target).unwrap();
        let desktop = tmp.path().join("Desktop");
        fs::create_dir(&desktop).unwrap();

        let link = create_shortcut(&target, &desktop).unwrap();
        assert_eq!(link, desktop.join("wow_merged"));
        assert_eq!(fs::read_link(&link).unwrap(), target);
    }

    #[test]
    fn mode_deserialises_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: RelocateMode,
        }
        let w: Wrapper = toml::from_str("mode = \"copy\"").unwrap();
        assert_eq!(w.mode, RelocateMode::Copy);
        assert_eq!(RelocateMode::default(), RelocateMode::Move);
    }
}
