//! Authorization decisions for host-supplied identities, and a guard that
//! gates protected operations on them.

use crate::engine::PolicyEngine;
use crate::errors::PolicyError;

/// Context key used to look up the default role for identities with no
/// explicit role assignment.
pub const DEFAULT_ROLE_CONTEXT: &str = "new_user";

/// Role implicitly added for elevated identities. This is a deliberate
/// bypass and is not derived from the hierarchy.
pub const ELEVATED_ROLE: &str = "superadmin";

/// Host-owned view of a principal. The engine never assumes anything about
/// the identity representation beyond these two flags.
pub trait Identity {
    fn is_authenticated(&self) -> bool {
        true
    }

    /// Superuser marker. Elevated identities receive the implicit
    /// [`ELEVATED_ROLE`] regardless of explicit assignment.
    fn is_elevated(&self) -> bool {
        false
    }
}

/// The single capability this crate consumes from the host: mapping an
/// identity to its assigned role names.
pub trait RoleProvider<I> {
    fn roles_for(&self, identity: &I) -> Vec<String>;
}

impl<I, F> RoleProvider<I> for F
where
    F: Fn(&I) -> Vec<String>,
{
    fn roles_for(&self, identity: &I) -> Vec<String> {
        self(identity)
    }
}

/// Combines the engine's snapshot with a host role provider to produce
/// allow/deny decisions.
pub struct AccessChecker<'a, P> {
    engine: &'a PolicyEngine,
    provider: P,
}

impl<'a, P> AccessChecker<'a, P> {
    pub fn new(engine: &'a PolicyEngine, provider: P) -> Self {
        Self { engine, provider }
    }

    /// Whether `identity` holds `permission`.
    ///
    /// An absent or unauthenticated identity is never authorized. An
    /// identity with no assigned roles is checked with the default role
    /// for [`DEFAULT_ROLE_CONTEXT`]; an elevated identity additionally
    /// carries [`ELEVATED_ROLE`].
    pub fn is_authorized<I>(
        &self,
        identity: Option<&I>,
        permission: &str,
    ) -> Result<bool, PolicyError>
    where
        I: Identity,
        P: RoleProvider<I>,
    {
        let Some(identity) = identity else {
            return Ok(false);
        };
        if !identity.is_authenticated() {
            return Ok(false);
        }

        let mut roles = self.provider.roles_for(identity);
        if roles.is_empty() {
            roles.push(self.engine.default_role(DEFAULT_ROLE_CONTEXT)?);
        }
        if identity.is_elevated() {
            roles.push(ELEVATED_ROLE.to_string());
        }

        self.engine.check_permission(&roles, permission)
    }

    /// Run `op` only if `identity` holds `permission`; otherwise
    /// short-circuit with [`PolicyError::Forbidden`] without invoking it.
    /// The operation's value passes through unchanged.
    pub fn guard<I, T>(
        &self,
        identity: Option<&I>,
        permission: &str,
        op: impl FnOnce() -> T,
    ) -> Result<T, PolicyError>
    where
        I: Identity,
        P: RoleProvider<I>,
    {
        if self.is_authorized(identity, permission)? {
            Ok(op())
        } else {
            Err(PolicyError::Forbidden {
                permission: permission.to_string(),
            })
        }
    }
}
