//! Workflow Metadata Validation
//!
//! Checks applied to the parsed metadata before anything touches the
//! deployment tree:
//! - Basename-only sanitization of names taken from YAML
//! - Consistency between the input and display workflow names

use log::debug;

use super::model::WorkflowDisplaySpec;
use crate::error::DeployError;

/// Reduces a YAML-provided name to its final path component.
///
/// Everything up to and including the last separator is dropped, so
/// `../../etc/passwd` becomes `passwd` and `nested/main.nf` becomes
/// `main.nf`. Names that end up empty, `.` or `..` cannot be used as a
/// path segment and are rejected.
pub fn sanitize_name(raw: &str) -> Result<String, DeployError> {
    let base = raw
        .rsplit(|c: char| c == '/' || c == std::path::MAIN_SEPARATOR)
        .next()
        .unwrap_or_default();

    match base {
        "" | "." | ".." => Err(DeployError::InvalidName(raw.to_string())),
        _ => {
            if base != raw {
                debug!("Sanitized '{}' to '{}'", raw, base);
            }
            Ok(base.to_string())
        }
    }
}

/// A disagreement between `workflowname` and the display `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameMismatch {
    pub workflow_name: String,
    pub display_name: Option<String>,
}

impl std::fmt::Display for NameMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.display_name {
            Some(name) => write!(
                f,
                "Workflow names do not match: '{}' vs '{}'",
                self.workflow_name, name
            ),
            None => write!(
                f,
                "Workflow names do not match: '{}' vs no display name",
                self.workflow_name
            ),
        }
    }
}

/// Compares the sanitized workflow name against the display spec.
///
/// A missing display `name` counts as a mismatch. Callers treat the
/// result as a warning only.
pub fn check_name_consistency(
    workflow_name: &str,
    display: &WorkflowDisplaySpec,
) -> Option<NameMismatch> {
    if display.name.as_deref() == Some(workflow_name) {
        return None;
    }

    Some(NameMismatch {
        workflow_name: workflow_name.to_string(),
        display_name: display.name.clone(),
    })
}
