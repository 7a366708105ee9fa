//! Workflow Deployer - Workflow Packaging Utility
//!
//! Collects workflow definition folders into a deployment tree. Every
//! folder carries a `workflowinput.yaml` naming the workflow and its
//! pipeline file, and a `workflowdisplay.yaml`; the deployer copies both,
//! the pipeline file and an optional `bin/` folder into
//! `deploy/workflows/<workflowname>/`.
//!
//! # Architecture
//!
//! - [`workflow`]: Metadata models, parsing and validation
//! - [`deploy`]: Discovery, manifest and copy logic
//! - [`error`]: Error type shared by both
//!
//! # Example
//!
//! ```rust,no_run
//! use workflow_deployer::Reorganizer;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let reorganizer = Reorganizer::new(std::env::current_dir()?);
//!     let summary = reorganizer.reorganize_all()?;
//!     println!("{} of {} workflows deployed", summary.succeeded(), summary.processed());
//!     Ok(())
//! }
//! ```

pub mod deploy;
pub mod error;
pub mod workflow;

// Re-export commonly used types
pub use deploy::reorganizer::{BatchSummary, DeployReport, Diagnostic, Reorganizer};
pub use error::DeployError;
pub use workflow::model::{WorkflowDisplaySpec, WorkflowInputSpec};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "Workflow Deployer";
