use crate::errors::PolicyError;
use crate::types::*;
use kdl::KdlDocument;

/// Parse a KDL policy document into typed definitions.
///
/// The document has four top-level sections, all optional:
///
/// ```kdl
/// roles {
///     role "editor" description="Can edit posts" {
///         permissions {
///             - "blog:edit,publish"
///         }
///     }
/// }
/// hierarchy {
///     role "admin" {
///         inherits {
///             - "editor"
///         }
///     }
/// }
/// modules {
///     module "blog" description="Blog posts" {
///         actions {
///             - "read"
///             - "edit"
///         }
///     }
/// }
/// defaults {
///     context "new_user" role="viewer"
/// }
/// ```
///
/// No semantic validation happens here: a hierarchy entry may name a role
/// that is never declared, and resolution treats it as an empty permission
/// set.
pub fn parse_kdl_document(source: &str) -> Result<Definitions, PolicyError> {
    let doc: KdlDocument = source
        .parse()
        .map_err(|e: kdl::KdlError| PolicyError::Parse(e.to_string()))?;

    let mut defs = Definitions::default();

    for node in doc.nodes() {
        match node.name().value() {
            "roles" => {
                for child in section_nodes(node) {
                    if child.name().value() != "role" {
                        return Err(PolicyError::InvalidPolicy(format!(
                            "unexpected node `{}` in `roles` section (expected `role`)",
                            child.name().value()
                        )));
                    }
                    let role = parse_role(child)?;
                    defs.roles.insert(role.name.clone(), role);
                }
            }
            "hierarchy" => {
                for child in section_nodes(node) {
                    if child.name().value() != "role" {
                        return Err(PolicyError::InvalidPolicy(format!(
                            "unexpected node `{}` in `hierarchy` section (expected `role`)",
                            child.name().value()
                        )));
                    }
                    let (name, parents) = parse_hierarchy_entry(child)?;
                    defs.hierarchy.insert(name, parents);
                }
            }
            "modules" => {
                for child in section_nodes(node) {
                    if child.name().value() != "module" {
                        return Err(PolicyError::InvalidPolicy(format!(
                            "unexpected node `{}` in `modules` section (expected `module`)",
                            child.name().value()
                        )));
                    }
                    let module = parse_module(child)?;
                    defs.modules.insert(module.name.clone(), module);
                }
            }
            "defaults" => {
                for child in section_nodes(node) {
                    if child.name().value() != "context" {
                        return Err(PolicyError::InvalidPolicy(format!(
                            "unexpected node `{}` in `defaults` section (expected `context`)",
                            child.name().value()
                        )));
                    }
                    let context = first_string_arg(child).ok_or_else(|| {
                        PolicyError::InvalidPolicy(
                            "context node requires a string argument (e.g. context \"new_user\" role=\"viewer\")"
                                .into(),
                        )
                    })?;
                    let role = child
                        .get("role")
                        .and_then(|v| v.as_string())
                        .ok_or_else(|| {
                            PolicyError::InvalidPolicy(format!(
                                "context `{context}` missing `role` property (e.g. role=\"viewer\")"
                            ))
                        })?;
                    defs.defaults.insert(context, role.to_string());
                }
            }
            other => {
                // Ignore comments and unknown top-level nodes with a warning
                tracing::warn!("ignoring unknown top-level KDL node `{other}`");
            }
        }
    }

    Ok(defs)
}

fn parse_role(node: &kdl::KdlNode) -> Result<RoleDefinition, PolicyError> {
    let name = first_string_arg(node).ok_or_else(|| {
        PolicyError::InvalidPolicy(
            "role node requires a string argument (e.g. role \"editor\")".into(),
        )
    })?;

    let description = node
        .get("description")
        .and_then(|v| v.as_string())
        .unwrap_or("")
        .to_string();

    let mut permissions = Vec::new();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "permissions" => {
                    permissions = dash_list(child);
                }
                other => {
                    return Err(PolicyError::InvalidPolicy(format!(
                        "unexpected child `{other}` in role `{name}` (expected `permissions`)"
                    )));
                }
            }
        }
    }

    Ok(RoleDefinition {
        name,
        description,
        permissions,
    })
}

fn parse_hierarchy_entry(node: &kdl::KdlNode) -> Result<(String, Vec<String>), PolicyError> {
    let name = first_string_arg(node).ok_or_else(|| {
        PolicyError::InvalidPolicy(
            "hierarchy role node requires a string argument (e.g. role \"admin\")".into(),
        )
    })?;

    let mut parents = Vec::new();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "inherits" => {
                    parents = dash_list(child);
                }
                other => {
                    return Err(PolicyError::InvalidPolicy(format!(
                        "unexpected child `{other}` in hierarchy entry `{name}` (expected `inherits`)"
                    )));
                }
            }
        }
    }

    Ok((name, parents))
}

fn parse_module(node: &kdl::KdlNode) -> Result<ModuleDescriptor, PolicyError> {
    let name = first_string_arg(node).ok_or_else(|| {
        PolicyError::InvalidPolicy(
            "module node requires a string argument (e.g. module \"blog\")".into(),
        )
    })?;

    let description = node
        .get("description")
        .and_then(|v| v.as_string())
        .unwrap_or("")
        .to_string();

    let mut actions = Vec::new();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "actions" => {
                    actions = dash_list(child);
                }
                other => {
                    return Err(PolicyError::InvalidPolicy(format!(
                        "unexpected child `{other}` in module `{name}` (expected `actions`)"
                    )));
                }
            }
        }
    }

    Ok(ModuleDescriptor {
        name,
        description,
        actions,
    })
}

/// Child nodes of a section, or an empty slice for a childless section.
fn section_nodes(node: &kdl::KdlNode) -> &[kdl::KdlNode] {
    node.children().map(|c| c.nodes()).unwrap_or(&[])
}

/// Extract the first string argument from a KDL node.
fn first_string_arg(node: &kdl::KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

/// Extract dash-list children: nodes named "-" whose first argument is a string.
/// Example KDL:
/// ```kdl
/// permissions {
///     - "blog:read"
///     - "blog:edit"
/// }
/// ```
fn dash_list(node: &kdl::KdlNode) -> Vec<String> {
    let Some(children) = node.children() else {
        return Vec::new();
    };
    children
        .nodes()
        .iter()
        .filter(|n| n.name().value() == "-")
        .filter_map(first_string_arg)
        .collect()
}
