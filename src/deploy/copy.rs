//! Dereferencing Copy Operations
//!
//! Copies manifest entries into a deployment target. Symlinks are always
//! followed: a linked file lands as a regular file and a linked folder as
//! a real folder, so the deployment tree never points back into the
//! source checkout.

use std::fs::{self, File, FileTimes};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

use crate::error::DeployError;

/// What kind of entry a copy produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyKind {
    /// A regular file, or a symlink to one
    File,
    /// A real directory
    Folder,
    /// A symlink to a directory, materialized as a directory
    LinkedFolder,
}

impl std::fmt::Display for CopyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Folder => write!(f, "folder"),
            Self::LinkedFolder => write!(f, "folder (symlink target)"),
        }
    }
}

/// Returns true if something, even a dangling symlink, sits at `path`.
pub fn entry_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Copies `source` to `destination`, replacing whatever is there.
///
/// Directories are copied recursively with [`copy_tree`] after the old
/// destination is removed. Anything else is copied next to the
/// destination first and renamed over it, so a failed copy leaves the
/// previous deployment in place.
pub fn copy_entry(source: &Path, destination: &Path) -> Result<CopyKind, DeployError> {
    let is_link = fs::symlink_metadata(source)
        .map(|meta| meta.file_type().is_symlink())
        .unwrap_or(false);

    if source.is_dir() {
        clear_destination(destination)?;
        copy_tree(source, destination)?;
        Ok(if is_link {
            CopyKind::LinkedFolder
        } else {
            CopyKind::Folder
        })
    } else {
        replace_file(source, destination)?;
        Ok(CopyKind::File)
    }
}

/// Hidden sibling used while a file is being copied into place.
fn staging_path(destination: &Path) -> PathBuf {
    let name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    destination.with_file_name(format!(".{}.partial", name))
}

fn replace_file(source: &Path, destination: &Path) -> Result<(), DeployError> {
    let staging = staging_path(destination);
    clear_destination(&staging)?;

    if let Err(e) = copy_file(source, &staging) {
        let _ = fs::remove_file(&staging);
        return Err(e);
    }

    // rename cannot replace a directory
    if fs::symlink_metadata(destination).map(|m| m.is_dir()).unwrap_or(false) {
        clear_destination(destination)?;
    }

    fs::rename(&staging, destination).map_err(|e| {
        let _ = fs::remove_file(&staging);
        DeployError::copy_failed(source, destination, e)
    })
}

/// Removes an existing file, symlink or directory tree at `path`.
pub fn clear_destination(path: &Path) -> Result<(), DeployError> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(DeployError::RemoveFailed(path.to_path_buf(), e)),
    };

    debug!("Removing existing {}", path.display());

    let result = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    result.map_err(|e| DeployError::RemoveFailed(path.to_path_buf(), e))
}

/// Copies a single file's content, permissions and timestamps.
///
/// Times and permissions go through the handle used for writing, so a
/// read-only source still produces a complete copy.
pub fn copy_file(source: &Path, destination: &Path) -> Result<(), DeployError> {
    write_copy(source, destination).map_err(|e| DeployError::copy_failed(source, destination, e))
}

fn write_copy(source: &Path, destination: &Path) -> io::Result<()> {
    let mut input = File::open(source)?;
    let meta = input.metadata()?;

    let mut output = File::create(destination)?;
    io::copy(&mut input, &mut output)?;

    let times = FileTimes::new()
        .set_accessed(meta.accessed()?)
        .set_modified(meta.modified()?);
    output.set_times(times)?;
    output.set_permissions(meta.permissions())
}

/// Recursively copies `source` into a new directory at `destination`.
///
/// Symlinks anywhere in the tree are followed. Individual failures do
/// not stop the walk; they are gathered and returned together as
/// [`DeployError::TreeCopyFailed`] once everything else has been copied.
pub fn copy_tree(source: &Path, destination: &Path) -> Result<(), DeployError> {
    fs::create_dir_all(destination)
        .map_err(|e| DeployError::CreateDirectoryFailed(destination.to_path_buf(), e))?;

    let mut failures = Vec::new();
    let mut directories: Vec<(PathBuf, PathBuf)> =
        vec![(source.to_path_buf(), destination.to_path_buf())];

    for entry in WalkDir::new(source).follow_links(true).min_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let at = e.path().unwrap_or(source).display().to_string();
                failures.push(format!("{}: {}", at, e));
                continue;
            }
        };

        let relative = match entry.path().strip_prefix(source) {
            Ok(relative) => relative,
            Err(_) => {
                failures.push(format!("{}: outside of {}", entry.path().display(), source.display()));
                continue;
            }
        };
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            match fs::create_dir_all(&target) {
                Ok(()) => directories.push((entry.path().to_path_buf(), target)),
                Err(e) => failures.push(format!("{}: {}", target.display(), e)),
            }
        } else if let Err(e) = copy_file(entry.path(), &target) {
            failures.push(e.to_string());
        }
    }

    // Children first, so read-only directories are locked only after they are filled
    for (dir, target) in directories.iter().rev() {
        if let Err(e) = fs::metadata(dir).and_then(|meta| fs::set_permissions(target, meta.permissions())) {
            failures.push(format!("{}: {}", target.display(), e));
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(DeployError::TreeCopyFailed {
            source_dir: source.to_path_buf(),
            failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_copy_file_content() {
        let temp_dir = tempdir().unwrap();
        let src = temp_dir.path().join("main.nf");
        let dst = temp_dir.path().join("copy.nf");
        fs::write(&src, "workflow {}\n").unwrap();

        assert_eq!(copy_entry(&src, &dst).unwrap(), CopyKind::File);
        assert_eq!(fs::read_to_string(&dst).unwrap(), "workflow {}\n");
    }

    #[test]
    fn test_copy_file_preserves_mtime() {
        let temp_dir = tempdir().unwrap();
        let src = temp_dir.path().join("main.nf");
        let dst = temp_dir.path().join("copy.nf");
        fs::write(&src, "x").unwrap();

        let past = std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_000_000);
        File::options()
            .write(true)
            .open(&src)
            .unwrap()
            .set_modified(past)
            .unwrap();

        copy_file(&src, &dst).unwrap();
        assert_eq!(fs::metadata(&dst).unwrap().modified().unwrap(), past);
    }

    #[test]
    fn test_copy_file_missing_source() {
        let temp_dir = tempdir().unwrap();
        let result = copy_file(
            &temp_dir.path().join("absent"),
            &temp_dir.path().join("dst"),
        );
        assert!(matches!(result, Err(DeployError::CopyFailed(..))));
    }

    #[test]
    fn test_failed_file_copy_keeps_previous_copy() {
        let temp_dir = tempdir().unwrap();
        let dst = temp_dir.path().join("main.nf");
        fs::write(&dst, "v1").unwrap();

        let result = copy_entry(&temp_dir.path().join("renamed_away.nf"), &dst);

        assert!(matches!(result, Err(DeployError::CopyFailed(..))));
        assert_eq!(fs::read_to_string(&dst).unwrap(), "v1");
        assert!(!staging_path(&dst).exists());
    }

    #[test]
    fn test_file_copy_replaces_previous_copy() {
        let temp_dir = tempdir().unwrap();
        let src = temp_dir.path().join("main.nf");
        let dst = temp_dir.path().join("deployed.nf");
        fs::write(&src, "v2").unwrap();
        fs::write(&dst, "v1").unwrap();

        copy_entry(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(&dst).unwrap(), "v2");
        assert!(!staging_path(&dst).exists());
    }

    #[test]
    fn test_file_copy_replaces_folder() {
        let temp_dir = tempdir().unwrap();
        let src = temp_dir.path().join("main.nf");
        fs::write(&src, "pipeline").unwrap();

        let dst = temp_dir.path().join("deployed.nf");
        fs::create_dir_all(dst.join("nested")).unwrap();

        assert_eq!(copy_entry(&src, &dst).unwrap(), CopyKind::File);
        assert_eq!(fs::read_to_string(&dst).unwrap(), "pipeline");
    }

    #[test]
    fn test_copy_tree_nested() {
        let temp_dir = tempdir().unwrap();
        let src = temp_dir.path().join("bin");
        fs::create_dir_all(src.join("lib")).unwrap();
        fs::write(src.join("run.sh"), "#!/bin/sh\n").unwrap();
        fs::write(src.join("lib").join("util.py"), "pass\n").unwrap();

        let dst = temp_dir.path().join("out").join("bin");
        assert_eq!(copy_entry(&src, &dst).unwrap(), CopyKind::Folder);

        assert_eq!(fs::read_to_string(dst.join("run.sh")).unwrap(), "#!/bin/sh\n");
        assert_eq!(fs::read_to_string(dst.join("lib").join("util.py")).unwrap(), "pass\n");
    }

    #[test]
    fn test_copy_tree_replaces_stale_content() {
        let temp_dir = tempdir().unwrap();
        let src = temp_dir.path().join("bin");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("current.sh"), "new").unwrap();

        let dst = temp_dir.path().join("dst");
        fs::create_dir_all(dst.join("bin")).unwrap();
        fs::write(dst.join("stale.sh"), "old").unwrap();

        copy_entry(&src, &dst).unwrap();

        assert!(dst.join("current.sh").exists());
        assert!(!dst.join("stale.sh").exists());
        assert!(!dst.join("bin").exists());
    }

    #[test]
    fn test_copy_entry_replaces_file_with_folder() {
        let temp_dir = tempdir().unwrap();
        let src = temp_dir.path().join("bin");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("a"), "a").unwrap();

        let dst = temp_dir.path().join("dst");
        fs::write(&dst, "plain file").unwrap();

        copy_entry(&src, &dst).unwrap();
        assert!(dst.is_dir());
        assert!(dst.join("a").exists());
    }

    #[test]
    fn test_clear_destination_absent_is_ok() {
        let temp_dir = tempdir().unwrap();
        assert!(clear_destination(&temp_dir.path().join("nothing")).is_ok());
    }

    #[test]
    fn test_entry_exists() {
        let temp_dir = tempdir().unwrap();
        assert!(entry_exists(temp_dir.path()));
        assert!(!entry_exists(&temp_dir.path().join("nothing")));
    }

    #[cfg(unix)]
    #[test]
    fn test_read_only_source_keeps_mode_and_mtime() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempdir().unwrap();
        let src = temp_dir.path().join("main.nf");
        let dst = temp_dir.path().join("copy.nf");
        fs::write(&src, "locked").unwrap();

        let past = std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(2_000_000);
        File::options()
            .write(true)
            .open(&src)
            .unwrap()
            .set_modified(past)
            .unwrap();
        fs::set_permissions(&src, fs::Permissions::from_mode(0o444)).unwrap();

        copy_entry(&src, &dst).unwrap();
        // a second run must be able to replace the read-only copy
        copy_entry(&src, &dst).unwrap();

        let meta = fs::metadata(&dst).unwrap();
        assert_eq!(fs::read_to_string(&dst).unwrap(), "locked");
        assert_eq!(meta.permissions().mode() & 0o777, 0o444);
        assert_eq!(meta.modified().unwrap(), past);
    }

    #[cfg(unix)]
    mod symlinks {
        use super::*;
        use std::os::unix::fs::symlink;

        #[test]
        fn test_symlinked_file_is_dereferenced() {
            let temp_dir = tempdir().unwrap();
            let real = temp_dir.path().join("real.nf");
            let link = temp_dir.path().join("main.nf");
            fs::write(&real, "real content").unwrap();
            symlink(&real, &link).unwrap();

            let dst = temp_dir.path().join("copy.nf");
            assert_eq!(copy_entry(&link, &dst).unwrap(), CopyKind::File);

            let meta = fs::symlink_metadata(&dst).unwrap();
            assert!(!meta.file_type().is_symlink());
            assert_eq!(fs::read_to_string(&dst).unwrap(), "real content");
        }

        #[test]
        fn test_symlinked_folder_is_materialized() {
            let temp_dir = tempdir().unwrap();
            let shared = temp_dir.path().join("shared_bin");
            fs::create_dir_all(&shared).unwrap();
            fs::write(shared.join("tool.sh"), "echo hi").unwrap();

            let link = temp_dir.path().join("bin");
            symlink(&shared, &link).unwrap();

            let dst = temp_dir.path().join("out");
            assert_eq!(copy_entry(&link, &dst).unwrap(), CopyKind::LinkedFolder);

            assert!(!fs::symlink_metadata(&dst).unwrap().file_type().is_symlink());
            assert_eq!(fs::read_to_string(dst.join("tool.sh")).unwrap(), "echo hi");
        }

        #[test]
        fn test_links_inside_tree_are_dereferenced() {
            let temp_dir = tempdir().unwrap();
            let outside = temp_dir.path().join("outside.txt");
            fs::write(&outside, "outside").unwrap();

            let src = temp_dir.path().join("bin");
            fs::create_dir_all(&src).unwrap();
            symlink(&outside, src.join("linked.txt")).unwrap();

            let dst = temp_dir.path().join("out");
            copy_tree(&src, &dst).unwrap();

            let copied = dst.join("linked.txt");
            assert!(!fs::symlink_metadata(&copied).unwrap().file_type().is_symlink());
            assert_eq!(fs::read_to_string(&copied).unwrap(), "outside");
        }

        #[test]
        fn test_dangling_link_in_tree_is_reported_after_copy() {
            let temp_dir = tempdir().unwrap();
            let src = temp_dir.path().join("bin");
            fs::create_dir_all(&src).unwrap();
            fs::write(src.join("good.sh"), "ok").unwrap();
            symlink(temp_dir.path().join("missing"), src.join("broken")).unwrap();

            let dst = temp_dir.path().join("out");
            let result = copy_tree(&src, &dst);

            match result {
                Err(DeployError::TreeCopyFailed { failures, .. }) => assert_eq!(failures.len(), 1),
                other => panic!("expected TreeCopyFailed, got {:?}", other),
            }
            assert_eq!(fs::read_to_string(dst.join("good.sh")).unwrap(), "ok");
        }

        #[test]
        fn test_dangling_link_keeps_previous_copy() {
            let temp_dir = tempdir().unwrap();
            let link = temp_dir.path().join("main.nf");
            symlink(temp_dir.path().join("gone.nf"), &link).unwrap();

            let dst = temp_dir.path().join("deployed.nf");
            fs::write(&dst, "v1").unwrap();

            assert!(copy_entry(&link, &dst).is_err());
            assert_eq!(fs::read_to_string(&dst).unwrap(), "v1");
        }

        #[test]
        fn test_clear_destination_removes_link_not_target() {
            let temp_dir = tempdir().unwrap();
            let target = temp_dir.path().join("target");
            fs::create_dir_all(&target).unwrap();
            fs::write(target.join("keep"), "keep").unwrap();

            let link = temp_dir.path().join("link");
            symlink(&target, &link).unwrap();

            clear_destination(&link).unwrap();
            assert!(!entry_exists(&link));
            assert!(target.join("keep").exists());
        }
    }
}
