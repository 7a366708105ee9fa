//! Workflow Metadata Module
//!
//! Data structures and utilities for reading the metadata that sits in
//! every workflow folder.
//!
//! # Structure
//!
//! - [`model`]: Typed input and display specifications
//! - [`parser`]: YAML loading with typed failures
//! - [`validator`]: Name sanitization and consistency checks

pub mod model;
pub mod parser;
pub mod validator;

pub use model::{WorkflowDisplaySpec, WorkflowInputSpec, DISPLAY_SPEC_FILE, INPUT_SPEC_FILE};
pub use parser::{load_display_spec, load_input_spec};
pub use validator::{check_name_consistency, sanitize_name, NameMismatch};
