//! Workflow Metadata Parser
//!
//! Loads `workflowinput.yaml` and `workflowdisplay.yaml` from a workflow
//! folder. Parsing goes through an untyped YAML value first so that a
//! malformed document, a missing key and a value of the wrong type each
//! surface as their own error.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::debug;
use serde_yaml::{Mapping, Value};

use super::model::{WorkflowDisplaySpec, WorkflowInputSpec, DISPLAY_SPEC_FILE, INPUT_SPEC_FILE};
use crate::error::DeployError;

/// Reads a YAML document from disk.
fn read_yaml(path: &Path) -> Result<Value, DeployError> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DeployError::MissingFile(path.to_path_buf()),
        _ => DeployError::ReadFailed(path.to_path_buf(), e),
    })?;

    debug!("Read {} ({} bytes)", path.display(), content.len());

    serde_yaml::from_str(&content).map_err(|e| DeployError::Parse(path.to_path_buf(), e))
}

fn into_mapping(doc: Value, path: &Path) -> Result<Mapping, DeployError> {
    match doc {
        Value::Mapping(mapping) => Ok(mapping),
        _ => Err(DeployError::NotAMapping(path.to_path_buf())),
    }
}

/// Pulls a required string out of a mapping.
fn required_string(
    mapping: &Mapping,
    key: &'static str,
    path: &Path,
) -> Result<String, DeployError> {
    let value = mapping.get(key).ok_or_else(|| DeployError::MissingKey {
        file: path.to_path_buf(),
        key,
    })?;

    serde_yaml::from_value(value.clone()).map_err(|source| DeployError::InvalidValue {
        file: path.to_path_buf(),
        key,
        source,
    })
}

/// Path of the input specification inside `folder`.
pub fn input_spec_path(folder: &Path) -> PathBuf {
    folder.join(INPUT_SPEC_FILE)
}

/// Path of the display specification inside `folder`.
pub fn display_spec_path(folder: &Path) -> PathBuf {
    folder.join(DISPLAY_SPEC_FILE)
}

/// Loads `workflowinput.yaml` from a workflow folder.
///
/// # Errors
///
/// * [`DeployError::MissingFile`] - the file does not exist
/// * [`DeployError::Parse`] - the content is not valid YAML
/// * [`DeployError::NotAMapping`] - the document is empty or not a mapping
/// * [`DeployError::MissingKey`] - `workflowname` or `workflowfile` is absent
/// * [`DeployError::InvalidValue`] - one of those keys is not a string
pub fn load_input_spec(folder: &Path) -> Result<WorkflowInputSpec, DeployError> {
    let path = input_spec_path(folder);
    let mapping = into_mapping(read_yaml(&path)?, &path)?;

    let workflowname = required_string(&mapping, "workflowname", &path)?;
    let workflowfile = required_string(&mapping, "workflowfile", &path)?;

    Ok(WorkflowInputSpec {
        workflowname,
        workflowfile,
    })
}

/// Loads `workflowdisplay.yaml` from a workflow folder.
///
/// Follows the same failure policy as [`load_input_spec`]. A missing or
/// non-string `name` is not an error; it only fails the name check later.
pub fn load_display_spec(folder: &Path) -> Result<WorkflowDisplaySpec, DeployError> {
    let path = display_spec_path(folder);
    let mapping = into_mapping(read_yaml(&path)?, &path)?;

    serde_yaml::from_value(Value::Mapping(mapping)).map_err(|source| DeployError::InvalidValue {
        file: path,
        key: "name",
        source,
    })
}
