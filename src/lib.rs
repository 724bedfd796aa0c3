//! Palisade - Embedded RBAC Policy Engine
//!
//! This crate loads declarative role and permission definitions from KDL
//! policy documents, flattens role inheritance into per-role permission
//! sets, and answers authorization checks for `module:action` permission
//! strings.
//!
//! Key concepts:
//!
//! 1. **Role**: a named bundle of permission rules, optionally inheriting
//!    from other roles through the `hierarchy` section.
//!
//! 2. **Permission rule**: a string like `"blog:edit"`, `"blog:a,b"` or
//!    `"*:*"` granted to a role; module and action both support wildcards.
//!
//! 3. **Snapshot**: one immutable, internally consistent build of the
//!    definitions plus resolved permission sets, published atomically by
//!    the engine and replaced as a whole on reload.
//!
//! 4. **RoleProvider**: the host-supplied capability mapping an identity to
//!    its assigned role names; the only thing this crate consumes.
//!
//! ```no_run
//! use palisade::{PolicyEngine, PolicySource};
//!
//! let engine = PolicyEngine::new(PolicySource::File("policies/roles.kdl".into()));
//! if engine.check_permission(&["editor"], "blog:publish")? {
//!     // publish the post
//! }
//! # Ok::<(), palisade::PolicyError>(())
//! ```

pub mod access;
pub mod engine;
pub mod errors;
pub mod loader;
pub mod matcher;
pub mod policy;
pub mod resolver;
pub mod types;

use std::collections::{HashMap, HashSet};
use types::{ModuleDescriptor, RoleDefinition};

// Re-export key types and traits for convenience
pub use access::{AccessChecker, Identity, RoleProvider, DEFAULT_ROLE_CONTEXT, ELEVATED_ROLE};
pub use engine::{PolicyEngine, PolicySource, FALLBACK_ROLE};
pub use errors::PolicyError;
pub use resolver::CyclePolicy;
pub use types::{Definitions, ModuleSummary, RoleSummary};

/// Fully compiled policy state, built from one policy source.
/// Immutable after construction — the engine replaces the whole snapshot
/// on reload rather than mutating it in place.
#[derive(Debug)]
pub struct PolicySnapshot {
    /// role name -> RoleDefinition
    pub roles: HashMap<String, RoleDefinition>,
    /// role name -> ordered list of parent role names
    pub hierarchy: HashMap<String, Vec<String>>,
    /// module name -> ModuleDescriptor (descriptive metadata only)
    pub modules: HashMap<String, ModuleDescriptor>,
    /// context key -> default role name
    pub defaults: HashMap<String, String>,
    /// role name -> flattened permission set (pre-computed, includes inheritance)
    pub resolved: HashMap<String, HashSet<String>>,
}
