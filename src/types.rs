use serde::Serialize;
use std::collections::HashMap;

/// A named bundle of permission rules, as declared in the `roles` section.
/// Immutable after load; replaced wholesale on reload.
#[derive(Debug, Clone)]
pub struct RoleDefinition {
    pub name: String,
    pub description: String,
    /// Permission rules like "blog:edit", "blog:a,b" or "*:*"
    pub permissions: Vec<String>,
}

/// Descriptive metadata for a module and the actions it supports.
/// Not consulted during matching.
#[derive(Debug, Clone)]
pub struct ModuleDescriptor {
    pub name: String,
    pub description: String,
    pub actions: Vec<String>,
}

/// Everything parsed out of a policy document, before resolution.
#[derive(Debug, Clone, Default)]
pub struct Definitions {
    /// role name -> RoleDefinition
    pub roles: HashMap<String, RoleDefinition>,
    /// role name -> ordered list of parent role names it inherits from
    pub hierarchy: HashMap<String, Vec<String>>,
    /// module name -> ModuleDescriptor
    pub modules: HashMap<String, ModuleDescriptor>,
    /// context key (e.g. "new_user") -> role name
    pub defaults: HashMap<String, String>,
}

// ---------- Introspection types ----------

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RoleSummary {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ModuleSummary {
    pub name: String,
    pub description: String,
    pub actions: Vec<String>,
}
