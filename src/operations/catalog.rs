//! Built-in operation definitions embedded in the binary
//!
//! Each catalog file lists the paginated operations of one service family,
//! so `run neptune-describe-events` works without a definition file.

use crate::error::{Error, Result};
use crate::operations::parser::load_operations_from_str;
use crate::operations::types::OperationDef;
use std::sync::LazyLock;

/// Built-in catalog YAML sources
pub static BUILTIN_CATALOGS: &[(&str, &str)] = &[
    ("neptune", include_str!("../../catalog/neptune.yaml")),
    ("ivs-realtime", include_str!("../../catalog/ivs-realtime.yaml")),
];

/// Parsed built-in operations, sorted by name
///
/// A catalog that fails to parse is reported by `builtin_operations`; the
/// cached list simply leaves it out.
static BUILTIN_OPERATIONS: LazyLock<Vec<OperationDef>> = LazyLock::new(|| {
    let mut ops: Vec<OperationDef> = BUILTIN_CATALOGS
        .iter()
        .filter_map(|(_, yaml)| load_operations_from_str(yaml).ok())
        .flatten()
        .collect();
    ops.sort_by(|a, b| a.name.cmp(&b.name));
    ops
});

/// Parse every built-in catalog, surfacing the first parse error
pub fn builtin_operations() -> Result<Vec<OperationDef>> {
    let mut ops = Vec::new();
    for (catalog, yaml) in BUILTIN_CATALOGS {
        let parsed = load_operations_from_str(yaml).map_err(|e| {
            Error::config(format!("Built-in catalog '{catalog}' is invalid: {e}"))
        })?;
        ops.extend(parsed);
    }
    ops.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(ops)
}

/// Get a built-in operation by name
pub fn get_builtin(name: &str) -> Option<&'static OperationDef> {
    BUILTIN_OPERATIONS.iter().find(|op| op.name == name)
}

/// List all built-in operation names
pub fn list_builtin() -> Vec<&'static str> {
    BUILTIN_OPERATIONS.iter().map(|op| op.name.as_str()).collect()
}

/// Check if an operation name is built-in
pub fn is_builtin(name: &str) -> bool {
    get_builtin(name).is_some()
}
