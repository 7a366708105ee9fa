//! Workflow Folder Discovery
//!
//! Finds candidate workflow folders among the immediate children of a
//! base directory.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::DeployError;

/// Name of the deployment root, never treated as a workflow folder.
pub const DEPLOY_DIR: &str = "deploy";

/// Returns true if a child named `name` can be a workflow folder.
///
/// Hidden entries (which covers `.git`, `.` and `..`) and the deployment
/// root are skipped.
pub fn is_candidate_name(name: &str) -> bool {
    !name.starts_with('.') && name != DEPLOY_DIR
}

/// Lists the candidate workflow folders directly under `base`.
///
/// Symlinks to directories count as folders. The result is sorted by
/// path so repeated runs report in the same order.
pub fn discover_workflow_folders(base: &Path) -> Result<Vec<PathBuf>, DeployError> {
    let entries =
        fs::read_dir(base).map_err(|e| DeployError::ReadDirFailed(base.to_path_buf(), e))?;

    let mut folders = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| DeployError::ReadDirFailed(base.to_path_buf(), e))?;
        let path = entry.path();

        let name = entry.file_name();
        if !is_candidate_name(&name.to_string_lossy()) {
            debug!("Skipping {}", path.display());
            continue;
        }

        if path.is_dir() {
            folders.push(path);
        }
    }

    folders.sort();
    Ok(folders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_candidate_names() {
        assert!(is_candidate_name("rnaseq"));
        assert!(!is_candidate_name("deploy"));
        assert!(!is_candidate_name(".git"));
        assert!(!is_candidate_name("."));
        assert!(!is_candidate_name(".."));
        assert!(!is_candidate_name(".cache"));
    }

    #[test]
    fn test_discover_skips_files_and_excluded() {
        let temp_dir = tempdir().unwrap();
        let base = temp_dir.path();
        fs::create_dir_all(base.join("wf_b")).unwrap();
        fs::create_dir_all(base.join("wf_a")).unwrap();
        fs::create_dir_all(base.join("deploy").join("workflows")).unwrap();
        fs::create_dir_all(base.join(".git")).unwrap();
        fs::write(base.join("README.md"), "docs").unwrap();

        let folders = discover_workflow_folders(base).unwrap();
        assert_eq!(folders, vec![base.join("wf_a"), base.join("wf_b")]);
    }

    #[test]
    fn test_discover_empty_base() {
        let temp_dir = tempdir().unwrap();
        assert!(discover_workflow_folders(temp_dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_discover_missing_base() {
        let temp_dir = tempdir().unwrap();
        let result = discover_workflow_folders(&temp_dir.path().join("absent"));
        assert!(matches!(result, Err(DeployError::ReadDirFailed(..))));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_discover_keeps_non_utf8_folder() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = tempdir().unwrap();
        let base = temp_dir.path();
        let odd = base.join(OsStr::from_bytes(b"wf_\xff"));
        fs::create_dir_all(&odd).unwrap();
        fs::create_dir_all(base.join(OsStr::from_bytes(b".hidden_\xff"))).unwrap();

        let folders = discover_workflow_folders(base).unwrap();
        assert_eq!(folders, vec![odd]);
    }

    #[cfg(unix)]
    #[test]
    fn test_discover_follows_symlinked_folder() {
        let temp_dir = tempdir().unwrap();
        let base = temp_dir.path().join("base");
        let elsewhere = temp_dir.path().join("elsewhere");
        fs::create_dir_all(&base).unwrap();
        fs::create_dir_all(&elsewhere).unwrap();
        std::os::unix::fs::symlink(&elsewhere, base.join("linked_wf")).unwrap();

        let folders = discover_workflow_folders(&base).unwrap();
        assert_eq!(folders, vec![base.join("linked_wf")]);
    }
}
