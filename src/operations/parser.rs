//! Loading operation definitions
//!
//! Accepts either a built-in operation name or a path to a YAML file. A file
//! may hold a single definition or an `operations:` list.

use crate::error::{Error, Result};
use crate::operations::catalog;
use crate::operations::types::{OperationDef, OperationFile};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Load one operation from a built-in name or a file path
///
/// When the file holds several operations, `name` selects one of them with
/// a `path#operation-name` suffix, otherwise the file must hold exactly one.
///
/// # Examples
///
/// ```ignore
/// let op = load_operation("neptune-describe-events")?;
/// let op = load_operation("./my-ops.yaml#list-widgets")?;
/// ```
pub fn load_operation(name_or_path: &str) -> Result<OperationDef> {
    if looks_like_name(name_or_path) {
        if let Some(def) = catalog::get_builtin(name_or_path) {
            return Ok(def.clone());
        }
    }

    let (path, selector) = match name_or_path.rsplit_once('#') {
        Some((path, op)) if !op.is_empty() => (path, Some(op)),
        _ => (name_or_path, None),
    };

    let content = fs::read_to_string(Path::new(path)).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::config(format!(
                "Operation '{}' not found. Built-in operations: {}. Or provide a path to a YAML file.",
                name_or_path,
                catalog::list_builtin().join(", ")
            ))
        } else {
            Error::config(format!("Failed to read operation file '{path}': {e}"))
        }
    })?;

    let mut ops = load_operations_from_str(&content)?;
    match selector {
        Some(op_name) => ops
            .into_iter()
            .find(|op| op.name == op_name)
            .ok_or_else(|| Error::config(format!("No operation '{op_name}' in '{path}'"))),
        None if ops.len() == 1 => Ok(ops.remove(0)),
        None => Err(Error::config(format!(
            "'{path}' defines {} operations; select one with '{path}#<name>'",
            ops.len()
        ))),
    }
}

/// Parse operation definitions from YAML
///
/// Both a bare definition and an `operations:` list are accepted.
pub fn load_operations_from_str(yaml: &str) -> Result<Vec<OperationDef>> {
    let value: serde_yaml::Value = serde_yaml::from_str(yaml)
        .map_err(|e| Error::config(format!("Failed to parse operation YAML: {e}")))?;

    let ops = if value.get("operations").is_some() {
        serde_yaml::from_value::<OperationFile>(value)
            .map_err(|e| Error::config(format!("Failed to parse operation YAML: {e}")))?
            .operations
    } else {
        vec![serde_yaml::from_value::<OperationDef>(value)
            .map_err(|e| Error::config(format!("Failed to parse operation YAML: {e}")))?]
    };

    if ops.is_empty() {
        return Err(Error::config("No operations defined"));
    }

    let mut seen = HashSet::new();
    for op in &ops {
        op.validate()?;
        if !seen.insert(op.name.as_str()) {
            return Err(Error::config(format!(
                "Duplicate operation name '{}'",
                op.name
            )));
        }
    }

    Ok(ops)
}

fn looks_like_name(s: &str) -> bool {
    !s.contains('/')
        && !s.contains('\\')
        && !s.contains('#')
        && !s.ends_with(".yaml")
        && !s.ends_with(".yml")
}
