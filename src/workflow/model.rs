//! Workflow Metadata Model
//!
//! Typed views of the two YAML documents that describe a workflow folder.
//!
//! # Example YAML Format
//!
//! `workflowinput.yaml`:
//!
//! ```yaml
//! workflowname: rnaseq_alignment
//! workflowfile: main.nf
//! parameters:
//!   - name: reads
//! ```
//!
//! `workflowdisplay.yaml`:
//!
//! ```yaml
//! name: rnaseq_alignment
//! displayname: RNA-Seq Alignment
//! ```
//!
//! Keys other than the ones modelled here are ignored.

use serde::de::Deserializer;
use serde::Deserialize;
use serde_yaml::Value;

/// File name of the input specification inside a workflow folder.
pub const INPUT_SPEC_FILE: &str = "workflowinput.yaml";

/// File name of the display specification inside a workflow folder.
pub const DISPLAY_SPEC_FILE: &str = "workflowdisplay.yaml";

/// Contents of `workflowinput.yaml` that matter for deployment.
///
/// Both fields hold the raw values from the file; callers sanitize them
/// with [`sanitize_name`](super::validator::sanitize_name) before using
/// them as path segments.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WorkflowInputSpec {
    /// Name of the workflow, used as the deployment folder name
    pub workflowname: String,

    /// Pipeline definition file to ship alongside the metadata
    pub workflowfile: String,
}

/// Contents of `workflowdisplay.yaml` that matter for deployment.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowDisplaySpec {
    /// Display-side workflow name, only used for a consistency check
    #[serde(default, deserialize_with = "optional_scalar")]
    pub name: Option<String>,
}

/// Keeps the textual form of whatever `name` holds.
///
/// Sequences and mappings are rendered back to YAML text so they simply
/// fail the name comparison instead of rejecting the document.
fn optional_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let val = Value::deserialize(deserializer)?;
    match val {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Ok(Some(
            serde_yaml::to_string(&other)
                .map(|rendered| rendered.trim_end().to_string())
                .unwrap_or_else(|_| format!("{:?}", other)),
        )),
    }
}

impl WorkflowInputSpec {
    pub fn new(workflowname: impl Into<String>, workflowfile: impl Into<String>) -> Self {
        Self {
            workflowname: workflowname.into(),
            workflowfile: workflowfile.into(),
        }
    }
}

impl WorkflowDisplaySpec {
    /// Creates a display spec carrying the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_spec_ignores_extra_keys() {
        let yaml = r#"
workflowname: sample
workflowfile: main.nf
parameters:
  - name: reads
    type: file
"#;
        let spec: WorkflowInputSpec = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(spec, WorkflowInputSpec::new("sample", "main.nf"));
    }

    #[test]
    fn test_display_spec_name_optional() {
        let spec: WorkflowDisplaySpec = serde_yaml::from_str("displayname: Sample\n").unwrap();
        assert_eq!(spec.name, None);
    }

    #[test]
    fn test_display_spec_scalar_name() {
        let spec: WorkflowDisplaySpec = serde_yaml::from_str("name: 2024\n").unwrap();
        assert_eq!(spec.name.as_deref(), Some("2024"));

        let spec: WorkflowDisplaySpec = serde_yaml::from_str("name: ~\n").unwrap();
        assert_eq!(spec.name, None);
    }

    #[test]
    fn test_display_spec_sequence_name_is_kept_as_text() {
        let spec: WorkflowDisplaySpec = serde_yaml::from_str("name: [sample, other]\n").unwrap();
        let name = spec.name.unwrap();
        assert!(name.contains("sample"));
        assert!(name.contains("other"));
        assert_ne!(name, "sample");
    }

    #[test]
    fn test_display_spec_mapping_name_is_kept_as_text() {
        let spec: WorkflowDisplaySpec = serde_yaml::from_str("name:\n  short: sample\n").unwrap();
        assert!(spec.name.unwrap().contains("short"));
    }
}
