//! Per-request authorization context.

use serde::Serialize;

use super::{OrgRole, Profile};

/// The output of the policy engine for a single request.
///
/// Combines the resolved profile with the organization scope and the
/// effective role the decision was made under. Constructed fresh per request
/// and never cached across requests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthContext {
    /// The resolved caller profile.
    pub profile: Profile,
    /// Organization scope of the decision.
    ///
    /// `None` only for platform admins, who are not required to scope their
    /// calls.
    pub organization_id: Option<String>,
    /// The membership role the decision was made under, or
    /// [`OrgRole::PlatformAdmin`] when the super-admin bypass applied.
    pub effective_role: OrgRole,
}

impl AuthContext {
    /// Returns `true` if this context was produced by the super-admin bypass.
    #[inline]
    #[must_use]
    pub fn is_platform_admin(&self) -> bool {
        self.effective_role == OrgRole::PlatformAdmin
    }

    /// Checks whether the caller can manage a member holding `target`.
    #[inline]
    #[must_use]
    pub fn can_manage(&self, target: OrgRole) -> bool {
        self.effective_role.can_manage(target)
    }

    /// Checks whether the caller can assign `new_role` to a member.
    #[inline]
    #[must_use]
    pub fn can_assign(&self, new_role: OrgRole) -> bool {
        self.effective_role.can_assign(new_role)
    }
}
