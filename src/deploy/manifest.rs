//! Deployment Manifest
//!
//! The fixed list of entries copied from a workflow folder into its
//! deployment target.

use crate::workflow::{DISPLAY_SPEC_FILE, INPUT_SPEC_FILE};

/// Name of the optional helper-script folder.
pub const BIN_DIR: &str = "bin";

/// One entry of the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// File or folder name, relative to both source and target folders
    pub name: String,

    /// Optional entries are skipped silently when absent
    pub optional: bool,
}

impl ManifestEntry {
    fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            optional: false,
        }
    }

    fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            optional: true,
        }
    }
}

/// Builds the manifest for a workflow whose pipeline file is `workflow_file`.
///
/// `workflow_file` must already be sanitized. Order is fixed: input spec,
/// display spec, pipeline file, `bin`.
pub fn build_manifest(workflow_file: &str) -> Vec<ManifestEntry> {
    vec![
        ManifestEntry::required(INPUT_SPEC_FILE),
        ManifestEntry::required(DISPLAY_SPEC_FILE),
        ManifestEntry::required(workflow_file),
        ManifestEntry::optional(BIN_DIR),
    ]
}
