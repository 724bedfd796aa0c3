//! Flattening of the role hierarchy into per-role permission sets.

use std::collections::{HashMap, HashSet};

use crate::errors::PolicyError;
use crate::types::Definitions;

/// What to do when the hierarchy contains an inheritance cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CyclePolicy {
    /// Stop traversal at already-visited roles. Permissions reachable only
    /// through the cyclic branch are silently dropped.
    #[default]
    Truncate,
    /// Fail the build with `PolicyError::CyclicHierarchy`.
    Reject,
}

/// Compute the flattened permission set for every declared role: the union
/// of its direct permissions and those of every role it transitively
/// inherits from.
///
/// A hierarchy entry may reference a role that is never declared; such
/// roles contribute an empty permission set. Runs once per snapshot build,
/// O(roles x edges).
pub fn resolve(
    defs: &Definitions,
    cycle_policy: CyclePolicy,
) -> Result<HashMap<String, HashSet<String>>, PolicyError> {
    if cycle_policy == CyclePolicy::Reject {
        check_hierarchy_cycles(&defs.hierarchy)?;
    }

    let mut resolved = HashMap::with_capacity(defs.roles.len());
    for name in defs.roles.keys() {
        resolved.insert(name.clone(), flatten(name, defs));
    }
    Ok(resolved)
}

/// Iterative traversal from `root` over the hierarchy, accumulating direct
/// permissions of every reachable role. The visited set is scoped to this
/// call, so a cyclic hierarchy terminates without recursing forever.
fn flatten(root: &str, defs: &Definitions) -> HashSet<String> {
    let mut permissions = HashSet::new();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&str> = vec![root];

    while let Some(name) = stack.pop() {
        if !visited.insert(name) {
            continue;
        }

        if let Some(role) = defs.roles.get(name) {
            permissions.extend(role.permissions.iter().cloned());
        }

        if let Some(parents) = defs.hierarchy.get(name) {
            for parent in parents {
                if !visited.contains(parent.as_str()) {
                    stack.push(parent.as_str());
                }
            }
        }
    }

    permissions
}

/// Check for cycles in the hierarchy using DFS.
fn check_hierarchy_cycles(hierarchy: &HashMap<String, Vec<String>>) -> Result<(), PolicyError> {
    let mut visited = HashSet::new();
    let mut in_stack = HashSet::new();

    for name in hierarchy.keys() {
        if !visited.contains(name.as_str()) {
            dfs_cycle_check(name, hierarchy, &mut visited, &mut in_stack)?;
        }
    }
    Ok(())
}

fn dfs_cycle_check<'a>(
    name: &'a str,
    hierarchy: &'a HashMap<String, Vec<String>>,
    visited: &mut HashSet<&'a str>,
    in_stack: &mut HashSet<&'a str>,
) -> Result<(), PolicyError> {
    visited.insert(name);
    in_stack.insert(name);

    if let Some(parents) = hierarchy.get(name) {
        for parent in parents {
            if in_stack.contains(parent.as_str()) {
                return Err(PolicyError::CyclicHierarchy(format!("{name} -> {parent}")));
            }
            if !visited.contains(parent.as_str()) {
                dfs_cycle_check(parent, hierarchy, visited, in_stack)?;
            }
        }
    }

    in_stack.remove(name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RoleDefinition;

    fn role(name: &str, permissions: &[&str]) -> (String, RoleDefinition) {
        (
            name.to_string(),
            RoleDefinition {
                name: name.to_string(),
                description: String::new(),
                permissions: permissions.iter().map(|p| p.to_string()).collect(),
            },
        )
    }

    fn make_defs(
        roles: Vec<(String, RoleDefinition)>,
        hierarchy: Vec<(&str, Vec<&str>)>,
    ) -> Definitions {
        Definitions {
            roles: roles.into_iter().collect(),
            hierarchy: hierarchy
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.into_iter().map(String::from).collect()))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_role_without_parents_keeps_direct_permissions() {
        let defs = make_defs(
            vec![role("viewer", &["blog:read", "shop:read"])],
            vec![],
        );
        let resolved = resolve(&defs, CyclePolicy::Truncate).unwrap();
        let viewer = &resolved["viewer"];
        assert_eq!(viewer.len(), 2);
        assert!(viewer.contains("blog:read"));
        assert!(viewer.contains("shop:read"));
    }

    #[test]
    fn test_transitive_inheritance_chain() {
        let defs = make_defs(
            vec![
                role("viewer", &["blog:read"]),
                role("editor", &["blog:edit"]),
                role("admin", &["users:manage"]),
            ],
            vec![("editor", vec!["viewer"]), ("admin", vec!["editor"])],
        );
        let resolved = resolve(&defs, CyclePolicy::Truncate).unwrap();

        let admin = &resolved["admin"];
        assert!(admin.contains("users:manage"));
        assert!(admin.contains("blog:edit"));
        assert!(admin.contains("blog:read"));

        // Inheritance only flows upward
        let viewer = &resolved["viewer"];
        assert_eq!(viewer.len(), 1);
    }

    #[test]
    fn test_multiple_parents_union() {
        let defs = make_defs(
            vec![
                role("blogger", &["blog:*"]),
                role("merchant", &["shop:*"]),
                role("owner", &[]),
            ],
            vec![("owner", vec!["blogger", "merchant"])],
        );
        let resolved = resolve(&defs, CyclePolicy::Truncate).unwrap();
        let owner = &resolved["owner"];
        assert!(owner.contains("blog:*"));
        assert!(owner.contains("shop:*"));
    }

    #[test]
    fn test_undefined_parent_contributes_nothing() {
        let defs = make_defs(
            vec![role("editor", &["blog:edit"])],
            vec![("editor", vec!["ghost"])],
        );
        let resolved = resolve(&defs, CyclePolicy::Truncate).unwrap();
        assert_eq!(resolved["editor"].len(), 1);
    }

    #[test]
    fn test_cycle_terminates_under_truncate() {
        let defs = make_defs(
            vec![role("a", &["x:1"]), role("b", &["x:2"])],
            vec![("a", vec!["b"]), ("b", vec!["a"])],
        );
        let resolved = resolve(&defs, CyclePolicy::Truncate).unwrap();

        // Both roles resolve; each still sees the union of the cycle
        assert!(resolved["a"].contains("x:1"));
        assert!(resolved["a"].contains("x:2"));
        assert!(resolved["b"].contains("x:1"));
        assert!(resolved["b"].contains("x:2"));
    }

    #[test]
    fn test_self_cycle_terminates() {
        let defs = make_defs(vec![role("a", &["x:1"])], vec![("a", vec!["a"])]);
        let resolved = resolve(&defs, CyclePolicy::Truncate).unwrap();
        assert_eq!(resolved["a"].len(), 1);
    }

    #[test]
    fn test_cycle_rejected_under_reject() {
        let defs = make_defs(
            vec![role("a", &[]), role("b", &[])],
            vec![("a", vec!["b"]), ("b", vec!["a"])],
        );
        let err = resolve(&defs, CyclePolicy::Reject).unwrap_err();
        assert!(matches!(err, PolicyError::CyclicHierarchy(_)));
    }

    #[test]
    fn test_acyclic_hierarchy_passes_reject() {
        let defs = make_defs(
            vec![role("viewer", &["blog:read"]), role("editor", &[])],
            vec![("editor", vec!["viewer"])],
        );
        assert!(resolve(&defs, CyclePolicy::Reject).is_ok());
    }

    #[test]
    fn test_diamond_hierarchy_visits_shared_parent_once() {
        // owner -> {a, b} -> base
        let defs = make_defs(
            vec![
                role("base", &["core:read"]),
                role("a", &["a:x"]),
                role("b", &["b:x"]),
                role("owner", &[]),
            ],
            vec![
                ("a", vec!["base"]),
                ("b", vec!["base"]),
                ("owner", vec!["a", "b"]),
            ],
        );
        // A diamond is not a cycle
        let resolved = resolve(&defs, CyclePolicy::Reject).unwrap();
        let owner = &resolved["owner"];
        assert!(owner.contains("core:read"));
        assert!(owner.contains("a:x"));
        assert!(owner.contains("b:x"));
    }
}
