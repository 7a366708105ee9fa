//! Error Types
//!
//! Every failure that can stop a single workflow from being deployed,
//! tagged with the path it happened on.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading, validating or copying a workflow.
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("File not found at {0}")]
    MissingFile(PathBuf),

    #[error("Failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),

    #[error("Cannot parse {0}: {1}")]
    Parse(PathBuf, serde_yaml::Error),

    #[error("{0} does not contain a YAML mapping")]
    NotAMapping(PathBuf),

    #[error("Missing key in {file}: '{key}'")]
    MissingKey { file: PathBuf, key: &'static str },

    #[error("Invalid value for '{key}' in {file}: {source}")]
    InvalidValue {
        file: PathBuf,
        key: &'static str,
        source: serde_yaml::Error,
    },

    #[error("'{0}' does not name a usable file or folder")]
    InvalidName(String),

    #[error("Error creating directory {0}: {1}")]
    CreateDirectoryFailed(PathBuf, std::io::Error),

    #[error("Failed to read directory {0}: {1}")]
    ReadDirFailed(PathBuf, std::io::Error),

    #[error("Failed to remove {0}: {1}")]
    RemoveFailed(PathBuf, std::io::Error),

    #[error("Failed to copy {0} to {1}: {2}")]
    CopyFailed(Box<PathBuf>, Box<PathBuf>, std::io::Error),

    #[error("Failed to copy {} of the entries under {}: {}", .failures.len(), .source_dir.display(), .failures.join("; "))]
    TreeCopyFailed {
        source_dir: PathBuf,
        failures: Vec<String>,
    },
}

impl DeployError {
    /// Builds a `CopyFailed` without boxing at every call site.
    pub fn copy_failed(from: impl Into<PathBuf>, to: impl Into<PathBuf>, err: std::io::Error) -> Self {
        DeployError::CopyFailed(Box::new(from.into()), Box::new(to.into()), err)
    }
}
