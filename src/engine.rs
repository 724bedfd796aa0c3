//! The policy engine facade: snapshot lifecycle, lazy initialization,
//! permission checks and introspection.

use std::path::PathBuf;
use std::sync::Arc;

use arc_swap::ArcSwap;
use once_cell::sync::OnceCell;

use crate::errors::PolicyError;
use crate::loader;
use crate::matcher;
use crate::policy::parse_kdl_document;
use crate::resolver::CyclePolicy;
use crate::types::{Definitions, ModuleSummary, RoleSummary};
use crate::PolicySnapshot;

/// Role returned by [`PolicyEngine::default_role`] when the requested
/// context has no entry in the `defaults` section.
pub const FALLBACK_ROLE: &str = "viewer";

/// Where the engine reads policy definitions from.
#[derive(Debug, Clone)]
pub enum PolicySource {
    /// A KDL policy file on disk. Re-read on every reload.
    File(PathBuf),
    /// An in-memory KDL document.
    Literal(String),
}

impl PolicySource {
    fn load(&self) -> Result<Definitions, PolicyError> {
        match self {
            PolicySource::File(path) => loader::load_definitions(path),
            PolicySource::Literal(text) => parse_kdl_document(text),
        }
    }
}

/// An explicitly constructed policy engine handle.
///
/// The engine owns exactly one live [`PolicySnapshot`] at a time. The first
/// operation that needs a snapshot triggers a guarded one-time build;
/// concurrent first access from multiple threads builds exactly once.
/// [`reload`](Self::reload) builds a complete new snapshot off-line and
/// publishes it with a single atomic swap, so readers in flight keep the
/// snapshot they started with and never observe a half-built one.
pub struct PolicyEngine {
    source: PolicySource,
    cycle_policy: CyclePolicy,
    snapshot: OnceCell<ArcSwap<PolicySnapshot>>,
}

impl PolicyEngine {
    pub fn new(source: PolicySource) -> Self {
        Self::with_cycle_policy(source, CyclePolicy::default())
    }

    pub fn with_cycle_policy(source: PolicySource, cycle_policy: CyclePolicy) -> Self {
        Self {
            source,
            cycle_policy,
            snapshot: OnceCell::new(),
        }
    }

    fn build(&self) -> Result<PolicySnapshot, PolicyError> {
        let defs = self.source.load()?;
        loader::compile(defs, self.cycle_policy)
    }

    fn cell(&self) -> Result<&ArcSwap<PolicySnapshot>, PolicyError> {
        self.snapshot
            .get_or_try_init(|| Ok(ArcSwap::from_pointee(self.build()?)))
    }

    /// The currently published snapshot, building it first if this is the
    /// initial access. The returned `Arc` stays valid across concurrent
    /// reloads.
    pub fn snapshot(&self) -> Result<Arc<PolicySnapshot>, PolicyError> {
        Ok(self.cell()?.load_full())
    }

    /// Build a fresh snapshot from the source and atomically replace the
    /// active one. On failure the previously active snapshot stays in
    /// effect and the error is returned.
    pub fn reload(&self) -> Result<(), PolicyError> {
        let next = Arc::new(self.build()?);
        if let Some(cell) = self.snapshot.get() {
            cell.store(next);
        } else if self.snapshot.set(ArcSwap::new(Arc::clone(&next))).is_err() {
            // Lost the init race against a concurrent first access;
            // publish over the winner's snapshot instead.
            if let Some(cell) = self.snapshot.get() {
                cell.store(next);
            }
        }
        Ok(())
    }

    /// The flattened permission set for `role`, or an empty set when the
    /// role is unknown.
    pub fn role_permissions(
        &self,
        role: &str,
    ) -> Result<std::collections::HashSet<String>, PolicyError> {
        let snapshot = self.snapshot()?;
        Ok(snapshot.resolved.get(role).cloned().unwrap_or_default())
    }

    /// Check whether any of the given roles grants `permission`
    /// (e.g. `"blog:publish"`). An empty role list never matches.
    pub fn check_permission<S: AsRef<str>>(
        &self,
        roles: &[S],
        permission: &str,
    ) -> Result<bool, PolicyError> {
        let snapshot = self.snapshot()?;
        let (module, action) = matcher::split_permission(permission);

        for role in roles {
            let Some(rules) = snapshot.resolved.get(role.as_ref()) else {
                continue;
            };
            if rules
                .iter()
                .any(|rule| matcher::rule_matches(rule, module, action))
            {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// All declared roles with their descriptions, sorted by name.
    pub fn list_roles(&self) -> Result<Vec<RoleSummary>, PolicyError> {
        let snapshot = self.snapshot()?;
        let mut roles: Vec<RoleSummary> = snapshot
            .roles
            .values()
            .map(|role| RoleSummary {
                name: role.name.clone(),
                description: role.description.clone(),
            })
            .collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }

    /// All declared modules with their actions, sorted by name.
    pub fn list_modules(&self) -> Result<Vec<ModuleSummary>, PolicyError> {
        let snapshot = self.snapshot()?;
        let mut modules: Vec<ModuleSummary> = snapshot
            .modules
            .values()
            .map(|module| ModuleSummary {
                name: module.name.clone(),
                description: module.description.clone(),
                actions: module.actions.clone(),
            })
            .collect();
        modules.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(modules)
    }

    /// The default role for a context key, falling back to
    /// [`FALLBACK_ROLE`] when the context has no entry.
    pub fn default_role(&self, context: &str) -> Result<String, PolicyError> {
        let snapshot = self.snapshot()?;
        Ok(snapshot
            .defaults
            .get(context)
            .cloned()
            .unwrap_or_else(|| FALLBACK_ROLE.to_string()))
    }
}
