use std::path::Path;

use crate::errors::PolicyError;
use crate::policy::parse_kdl_document;
use crate::resolver::{self, CyclePolicy};
use crate::types::Definitions;
use crate::PolicySnapshot;

/// Read and parse the policy file at `path`.
pub fn load_definitions(path: &Path) -> Result<Definitions, PolicyError> {
    if !path.is_file() {
        return Err(PolicyError::ConfigNotFound {
            path: path.display().to_string(),
        });
    }

    let contents = std::fs::read_to_string(path).map_err(|source| PolicyError::ConfigRead {
        path: path.display().to_string(),
        source,
    })?;

    parse_kdl_document(&contents)
}

/// Compile parsed definitions into an immutable `PolicySnapshot`, resolving
/// the hierarchy into flattened per-role permission sets.
pub fn compile(
    defs: Definitions,
    cycle_policy: CyclePolicy,
) -> Result<PolicySnapshot, PolicyError> {
    let resolved = resolver::resolve(&defs, cycle_policy)?;

    tracing::info!(
        roles = defs.roles.len(),
        modules = defs.modules.len(),
        defaults = defs.defaults.len(),
        "Compiled policy snapshot"
    );

    Ok(PolicySnapshot {
        roles: defs.roles,
        hierarchy: defs.hierarchy,
        modules: defs.modules,
        defaults: defs.defaults,
        resolved,
    })
}
