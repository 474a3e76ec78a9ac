//! Capability-based filesystem helpers for locating and creating the
//! grocery database on disk.
//!
//! Paths are UTF-8 (`camino`) and every access goes through `cap-std`
//! directories opened with ambient authority.
#![forbid(unsafe_code)]

use std::io;
use std::path::Component;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};

/// Open the directory containing `path` and return it with the file name.
///
/// A bare file name resolves against the current directory.
pub fn open_parent_dir(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} does not name a file")))?
        .to_owned();
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Create every missing directory above `path`.
///
/// Paths without a parent, or whose parent is the filesystem root, need
/// nothing created.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() || parent == Utf8Path::new("/") {
        return Ok(());
    }

    let (base, relative) = split_anchor(parent)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    base.create_dir_all(&relative)
}

/// Whether `path` exists and is a regular file.
///
/// A missing parent directory surfaces as [`io::ErrorKind::NotFound`];
/// a missing file inside an existing directory does too.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_parent_dir(path)?;
    dir.metadata(name.as_str()).map(|meta| meta.is_file())
}

/// Split `parent` into an ambient anchor directory and the relative
/// remainder below it.
///
/// Absolute paths anchor at the root (or drive prefix on Windows); relative
/// paths anchor at the current directory.
pub fn split_anchor(parent: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let std_parent = parent.as_std_path();

    let (anchor, relative) = match std_parent.components().next() {
        Some(Component::Prefix(prefix)) => {
            let prefix_str = prefix
                .as_os_str()
                .to_str()
                .ok_or_else(|| io::Error::other("non-UTF-8 path prefix"))?;
            let anchor =
                Utf8PathBuf::from(prefix_str).join(std::path::MAIN_SEPARATOR.to_string());
            let relative = std_parent
                .strip_prefix(anchor.as_std_path())
                .or_else(|_| std_parent.strip_prefix(prefix.as_os_str()))
                .map_err(|_| io::Error::other(format!("cannot strip drive from {parent}")))?
                .to_path_buf();
            (anchor, relative)
        }
        Some(Component::RootDir) => {
            let anchor = Utf8PathBuf::from(std::path::MAIN_SEPARATOR.to_string());
            let relative = std_parent
                .strip_prefix(anchor.as_std_path())
                .map_err(|_| io::Error::other(format!("cannot strip root from {parent}")))?
                .to_path_buf();
            (anchor, relative)
        }
        _ => (Utf8PathBuf::from("."), std_parent.to_path_buf()),
    };

    let dir = fs_utf8::Dir::open_ambient_dir(&anchor, ambient_authority())?;
    let relative = Utf8PathBuf::from_path_buf(relative)
        .map_err(|_| io::Error::other(format!("{parent} is not valid UTF-8")))?;
    Ok((dir, relative))
}

#[cfg(test)]
mod tests {
    //! Exercises the helpers against a temporary directory.

    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn temp_root() -> (TempDir, Utf8PathBuf) {
        let dir = TempDir::new().expect("create temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .expect("temp dir should be UTF-8");
        (dir, root)
    }

    #[rstest]
    fn creates_nested_parent_directories(temp_root: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = temp_root;
        let database = root.join("state").join("grocery").join("grocery.db");
        ensure_parent_dir(&database).expect("create parents");
        assert!(database.parent().expect("parent").is_dir());
    }

    #[rstest]
    fn bare_file_name_needs_no_directories() {
        ensure_parent_dir(Utf8Path::new("grocery.db")).expect("nothing to create");
    }

    #[rstest]
    fn reports_regular_files(temp_root: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = temp_root;
        let database = root.join("grocery.db");
        std::fs::write(&database, b"").expect("write file");
        assert!(file_is_file(&database).expect("inspect file"));

        let directory = root.join("cache");
        std::fs::create_dir(&directory).expect("create dir");
        assert!(!file_is_file(&directory).expect("inspect dir"));
    }

    #[rstest]
    fn missing_file_is_not_found(temp_root: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = temp_root;
        let err = file_is_file(&root.join("absent.db")).expect_err("file is absent");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[rstest]
    fn splits_absolute_paths_at_the_root(temp_root: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = temp_root;
        let (_dir, relative) = split_anchor(&root).expect("split");
        assert!(!relative.is_absolute());
        assert!(root.as_str().ends_with(relative.as_str()));
    }
}
