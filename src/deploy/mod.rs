//! Deployment Module
//!
//! Builds the `deploy/workflows/<name>` tree from workflow folders.
//!
//! # Architecture
//!
//! - [`discovery`]: Finds candidate workflow folders
//! - [`manifest`]: Fixed list of entries to ship
//! - [`copy`]: Symlink-dereferencing copies with clean overwrite
//! - [`reorganizer`]: Per-folder pipeline and batch driver

pub mod copy;
pub mod discovery;
pub mod manifest;
pub mod reorganizer;

pub use copy::CopyKind;
pub use discovery::discover_workflow_folders;
pub use manifest::{build_manifest, ManifestEntry};
pub use reorganizer::{BatchSummary, CopiedItem, DeployReport, Diagnostic, Reorganizer};
