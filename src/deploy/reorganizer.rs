//! Workflow Reorganizer
//!
//! Turns workflow folders into the deployment layout:
//!
//! ```text
//! <base>/
//! ├── rnaseq/                      source folder
//! │   ├── workflowinput.yaml
//! │   ├── workflowdisplay.yaml
//! │   ├── main.nf
//! │   └── bin/
//! └── deploy/
//!     └── workflows/
//!         └── rnaseq_alignment/    named after `workflowname`
//!             ├── workflowinput.yaml
//!             ├── workflowdisplay.yaml
//!             ├── main.nf
//!             └── bin/
//! ```
//!
//! Each folder is handled as a linear pipeline. Metadata problems and a
//! failure to create the target folder abort that folder only; problems
//! with individual manifest entries are recorded as diagnostics and the
//! remaining entries are still copied.

use std::fs;
use std::path::{Path, PathBuf};

use log::{error, info, warn};

use super::copy::{copy_entry, entry_exists, CopyKind};
use super::discovery::{discover_workflow_folders, DEPLOY_DIR};
use super::manifest::build_manifest;
use crate::error::DeployError;
use crate::workflow::{
    check_name_consistency, load_display_spec, load_input_spec, sanitize_name, NameMismatch,
};

/// Folder under the deployment root holding one folder per workflow.
pub const WORKFLOWS_DIR: &str = "workflows";

/// Width of the rule printed after each workflow.
const RULE_WIDTH: usize = 50;

/// A non-fatal problem met while deploying a workflow.
#[derive(Debug)]
pub enum Diagnostic {
    /// `workflowname` and the display `name` disagree
    NameMismatch(NameMismatch),
    /// A required manifest entry was absent from the source folder
    MissingEntry(PathBuf),
    /// A manifest entry could not be copied
    CopyFailed { item: String, error: DeployError },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NameMismatch(mismatch) => write!(f, "{}", mismatch),
            Self::MissingEntry(path) => {
                write!(f, "Required file/folder not found: {}", path.display())
            }
            Self::CopyFailed { item, error } => write!(f, "Error copying {}: {}", item, error),
        }
    }
}

/// A manifest entry that made it into the target folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopiedItem {
    pub name: String,
    pub kind: CopyKind,
}

/// Outcome of deploying one workflow folder.
#[derive(Debug)]
pub struct DeployReport {
    /// Sanitized workflow name
    pub workflow_name: String,
    pub source_dir: PathBuf,
    pub target_dir: PathBuf,
    pub copied: Vec<CopiedItem>,
    pub diagnostics: Vec<Diagnostic>,
}

impl DeployReport {
    /// Returns true if every required manifest entry was copied.
    pub fn is_complete(&self) -> bool {
        !self
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::MissingEntry(_) | Diagnostic::CopyFailed { .. }))
    }

    /// Returns true if the named entry was copied.
    pub fn contains(&self, name: &str) -> bool {
        self.copied.iter().any(|item| item.name == name)
    }
}

/// Totals for a whole run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub reports: Vec<DeployReport>,
    pub failures: Vec<(PathBuf, DeployError)>,
}

impl BatchSummary {
    pub fn processed(&self) -> usize {
        self.reports.len() + self.failures.len()
    }

    pub fn succeeded(&self) -> usize {
        self.reports.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Number of diagnostics across all deployed workflows.
    pub fn warnings(&self) -> usize {
        self.reports.iter().map(|r| r.diagnostics.len()).sum()
    }
}

/// Deploys workflow folders found under a base directory.
///
/// # Example
///
/// ```rust,no_run
/// use std::path::Path;
/// use workflow_deployer::Reorganizer;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let reorganizer = Reorganizer::new("/data/workflows");
///     let report = reorganizer.reorganize(Path::new("/data/workflows/rnaseq"))?;
///     println!("Deployed to {}", report.target_dir.display());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Reorganizer {
    base_dir: PathBuf,
}

impl Reorganizer {
    /// Creates a reorganizer writing to `<base_dir>/deploy/workflows`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Directory that receives one folder per workflow.
    pub fn workflows_root(&self) -> PathBuf {
        self.base_dir.join(DEPLOY_DIR).join(WORKFLOWS_DIR)
    }

    /// Target folder for a sanitized workflow name.
    pub fn target_dir(&self, workflow_name: &str) -> PathBuf {
        self.workflows_root().join(workflow_name)
    }

    /// Deploys a single workflow folder.
    ///
    /// Nothing is written unless both metadata files load and the names
    /// they carry are usable. After the target folder exists, manifest
    /// entries are copied one by one; failures there are returned as
    /// diagnostics in the report rather than as an error, and entries
    /// already copied are kept.
    ///
    /// # Errors
    ///
    /// Returns an error when a metadata file is missing or malformed, a
    /// required key is absent, a name sanitizes to nothing, or the target
    /// folder cannot be created.
    pub fn reorganize(&self, folder: &Path) -> Result<DeployReport, DeployError> {
        info!("--- Processing Workflow Folder: {} ---", folder.display());

        let input = load_input_spec(folder)?;
        let workflow_name = sanitize_name(&input.workflowname)?;
        let workflow_file = sanitize_name(&input.workflowfile)?;

        let display = load_display_spec(folder)?;

        let mut diagnostics = Vec::new();
        if let Some(mismatch) = check_name_consistency(&workflow_name, &display) {
            warn!("{}", mismatch);
            warn!("Proceeding despite name mismatch.");
            diagnostics.push(Diagnostic::NameMismatch(mismatch));
        }

        let target_dir = self.target_dir(&workflow_name);
        fs::create_dir_all(&target_dir)
            .map_err(|e| DeployError::CreateDirectoryFailed(target_dir.clone(), e))?;
        info!("Created/Ensured target folder: {}", target_dir.display());

        let mut copied = Vec::new();
        for entry in build_manifest(&workflow_file) {
            let source = folder.join(&entry.name);
            let destination = target_dir.join(&entry.name);

            if !entry_exists(&source) {
                if !entry.optional {
                    warn!(
                        "Required file/folder not found: {}. Skipping.",
                        source.display()
                    );
                    diagnostics.push(Diagnostic::MissingEntry(source));
                }
                continue;
            }

            match copy_entry(&source, &destination) {
                Ok(kind) => {
                    info!("Copied {}: {} (dereferenced)", kind, entry.name);
                    copied.push(CopiedItem {
                        name: entry.name,
                        kind,
                    });
                }
                Err(e) => {
                    error!("Error copying {}: {}", entry.name, e);
                    diagnostics.push(Diagnostic::CopyFailed {
                        item: entry.name,
                        error: e,
                    });
                }
            }
        }

        info!("--- Successfully reorganized {} ---", workflow_name);
        info!("{}", "-".repeat(RULE_WIDTH));

        Ok(DeployReport {
            workflow_name,
            source_dir: folder.to_path_buf(),
            target_dir,
            copied,
            diagnostics,
        })
    }

    /// Discovers and deploys every workflow folder under the base directory.
    ///
    /// Folders are processed one after another. A folder that fails is
    /// logged and recorded in the summary; the rest still run.
    ///
    /// # Errors
    ///
    /// Only fails if the base directory itself cannot be listed.
    pub fn reorganize_all(&self) -> Result<BatchSummary, DeployError> {
        let folders = discover_workflow_folders(&self.base_dir)?;

        let mut summary = BatchSummary::default();
        if folders.is_empty() {
            warn!(
                "No workflow sub-folders found in {}. Please check your working directory/path.",
                self.base_dir.display()
            );
            return Ok(summary);
        }

        info!("Found {} workflow folder(s) to process.", folders.len());

        for folder in folders {
            match self.reorganize(&folder) {
                Ok(report) => summary.reports.push(report),
                Err(e) => {
                    error!("{}", e);
                    summary.failures.push((folder, e));
                }
            }
        }

        Ok(summary)
    }
}
